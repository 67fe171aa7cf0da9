//! Origin/destination pairs.
//!
//! `OdPairs` holds two equally long [`CoordinateSet`]s; origin `i` travels to
//! destination `i`.  Both sets always share one CRS.

use std::path::Path;

use geo::Polygon;
use tracing::info;

use sn_core::{Crs, CrsRegistry};

use crate::geocode::{reverse_geocode, Geocoder};
use crate::loader::load_coords_csv;
use crate::{CoordinateSet, PointsError, PointsResult};

/// Default clearance, in degrees, around the pairs when a network extent is
/// derived from them.
pub const DEFAULT_EXTENT_BUFFER_DEG: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OdPairs {
    origins:      CoordinateSet,
    destinations: CoordinateSet,
}

impl OdPairs {
    /// Pair two sets.  Counts and CRSs must match.
    pub fn new(origins: CoordinateSet, destinations: CoordinateSet) -> PointsResult<Self> {
        if origins.len() != destinations.len() {
            return Err(PointsError::CountMismatch {
                origins:      origins.len(),
                destinations: destinations.len(),
            });
        }
        if origins.crs() != destinations.crs() {
            return Err(PointsError::CrsMismatch {
                expected: origins.crs(),
                found:    destinations.crs(),
            });
        }
        Ok(Self { origins, destinations })
    }

    /// Pairs from `(lat, lon)` literals.
    pub fn from_lat_lon(origins: &[(f64, f64)], destinations: &[(f64, f64)]) -> PointsResult<Self> {
        Self::new(
            CoordinateSet::from_lat_lon(origins)?,
            CoordinateSet::from_lat_lon(destinations)?,
        )
    }

    /// Pairs from two coordinate files.
    ///
    /// Both paths are checked for existence before either is parsed, and
    /// both files are fully parsed before the counts are compared.
    pub fn from_csv(origins: &Path, destinations: &Path) -> PointsResult<Self> {
        for path in [origins, destinations] {
            if !path.is_file() {
                return Err(PointsError::MissingFile(path.to_path_buf()));
            }
        }
        let pairs = Self::new(load_coords_csv(origins)?, load_coords_csv(destinations)?)?;
        info!(pairs = pairs.len(), "loaded origin/destination files");
        Ok(pairs)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn crs(&self) -> Crs {
        self.origins.crs()
    }

    pub fn origins(&self) -> &CoordinateSet {
        &self.origins
    }

    pub fn destinations(&self) -> &CoordinateSet {
        &self.destinations
    }

    /// Reverse geocode both sets.
    ///
    /// Both sets are replaced together; on error neither changes.
    pub fn geocode<G: Geocoder + ?Sized>(&mut self, geocoder: &G) -> PointsResult<()> {
        let origins = reverse_geocode(geocoder, &self.origins)?;
        let destinations = reverse_geocode(geocoder, &self.destinations)?;
        self.origins = origins;
        self.destinations = destinations;
        Ok(())
    }

    /// Re-express both sets in `target`.  A no-op if they already are.
    ///
    /// Both sets are replaced together; on error neither changes, so the
    /// pairs never straddle two CRSs.
    pub fn to_crs(&mut self, registry: &mut CrsRegistry, target: Crs) -> PointsResult<()> {
        if self.crs() == target {
            return Ok(());
        }
        let origins = registry.to_crs(target.clone(), self.origins.clone())?;
        let destinations = registry.to_crs(target, self.destinations.clone())?;
        self.origins = origins;
        self.destinations = destinations;
        Ok(())
    }

    /// Origins followed by destinations.
    pub fn all_points(&self) -> CoordinateSet {
        let mut points = self.origins.points().to_vec();
        points.extend_from_slice(self.destinations.points());
        CoordinateSet::from_points(points, self.crs())
    }

    /// Buffered convex hull of every origin and destination, in the pairs' CRS.
    pub fn extent(&self, buffer: f64) -> PointsResult<Polygon<f64>> {
        self.all_points().extent(buffer)
    }
}
