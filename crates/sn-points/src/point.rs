//! A single located point with an optional address.

use geo::Coord;

use sn_core::GeoPoint;

/// One point of a [`CoordinateSet`](crate::CoordinateSet).
///
/// `coord` is expressed in the owning set's CRS; the point itself carries no
/// CRS tag.  `address` is filled in by reverse geocoding and never changes
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub coord:   Coord<f64>,
    pub address: Option<String>,
}

impl Point {
    #[inline]
    pub fn new(coord: Coord<f64>) -> Self {
        Self { coord, address: None }
    }

    /// Geographic point from latitude/longitude (`x` = lon, `y` = lat).
    #[inline]
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self::new(GeoPoint::new(lat, lon).to_coord())
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.coord.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.coord.y
    }
}

impl From<GeoPoint> for Point {
    fn from(p: GeoPoint) -> Self {
        Self::new(p.to_coord())
    }
}
