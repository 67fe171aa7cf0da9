//! Geocoding seam.
//!
//! The geocoding service lives outside this workspace.  Callers plug one in
//! through [`Geocoder`]; the pipeline only ever asks for reverse lookups.

use tracing::debug;

use sn_core::{Crs, CrsRegistry, GeoPoint};

use crate::{CoordinateSet, Point, PointsError, PointsResult};

/// Pluggable address lookup.
pub trait Geocoder {
    /// Address text for a WGS84 position.
    ///
    /// Failures are reported as [`PointsError::Retrieval`] and are not
    /// retried by the caller.
    fn reverse(&self, point: GeoPoint) -> PointsResult<String>;

    /// Position for an address.  Not provided by default.
    fn forward(&self, _address: &str) -> PointsResult<GeoPoint> {
        Err(PointsError::Unsupported("forward geocoding"))
    }
}

/// Fill in the address of every point of `set` that does not have one yet.
///
/// Lookups are made in WGS84 whatever the set's CRS; the returned set keeps
/// the input CRS, order and coordinates.  The first failing lookup aborts the
/// whole call.
pub fn reverse_geocode<G: Geocoder + ?Sized>(
    geocoder: &G,
    set: &CoordinateSet,
) -> PointsResult<CoordinateSet> {
    let mut registry = CrsRegistry::new();
    let geographic = registry.to_crs_ref(Crs::Wgs84, set)?;

    let mut looked_up = 0usize;
    let points = set
        .iter()
        .zip(geographic.iter())
        .map(|(original, wgs)| {
            if original.address.is_some() {
                return Ok(original.clone());
            }
            let address = geocoder.reverse(GeoPoint::from_coord(wgs.coord))?;
            looked_up += 1;
            Ok(Point { coord: original.coord, address: Some(address) })
        })
        .collect::<PointsResult<Vec<_>>>()?;

    debug!(looked_up, total = set.len(), "reverse geocoded point set");
    Ok(CoordinateSet::from_points(points, set.crs()))
}
