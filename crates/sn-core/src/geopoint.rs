//! WGS84 latitude/longitude pairs, great-circle distance and UTM zone lookup.
//!
//! `GeoPoint` is always WGS-84 latitude/longitude in double precision.  It is
//! the currency of everything that talks to the outside world (backends,
//! geocoders, descriptors).  Inside a projected collection, positions are
//! plain `geo::Coord<f64>` values in that collection's CRS.

use geo::Coord;

use crate::crs::{Crs, Hemisphere};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from a geographic `Coord` (`x` = longitude, `y` = latitude).
    #[inline]
    pub fn from_coord(c: Coord<f64>) -> Self {
        Self { lat: c.y, lon: c.x }
    }

    /// Express as a geographic `Coord` (`x` = longitude, `y` = latitude).
    #[inline]
    pub fn to_coord(self) -> Coord<f64> {
        Coord { x: self.lon, y: self.lat }
    }

    /// `true` if latitude is within ±90 and longitude within ±180.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Spherical model; good to ~0.5 %.  Use a projected CRS when lengths must
    /// agree with planar geometry.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// UTM zone number (1–60) containing this point.
    ///
    /// Plain 6° bands; the Norway/Svalbard exceptions are not applied.
    pub fn utm_zone(self) -> u8 {
        let zone = ((self.lon + 180.0) / 6.0).floor() as i32 + 1;
        zone.clamp(1, 60) as u8
    }

    /// The UTM CRS whose zone contains this point.
    pub fn utm_crs(self) -> Crs {
        let hemisphere = if self.lat >= 0.0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        };
        Crs::Utm { zone: self.utm_zone(), hemisphere }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
