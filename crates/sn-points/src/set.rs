//! `CoordinateSet`: an ordered, single-CRS collection of points.
//!
//! A set is fixed at construction.  The only way to change it afterwards is
//! reprojection, which yields a new set with the same points (same order,
//! same addresses) expressed in another CRS.

use std::f64::consts::TAU;

use geo::{Centroid, ConvexHull, Coord, MultiPoint, Polygon};

use sn_core::{CoreError, CoreResult, Crs, GeoPoint, Reproject, Transformer};

use crate::{Point, PointsError, PointsResult};

/// Vertices used to approximate the round corners of a buffered hull.
const BUFFER_SEGMENTS: usize = 16;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinateSet {
    points: Vec<Point>,
    crs:    Crs,
}

impl CoordinateSet {
    /// Points already expressed in `crs`.
    pub fn from_points(points: Vec<Point>, crs: Crs) -> Self {
        Self { points, crs }
    }

    /// WGS84 set from `(lat, lon)` pairs.
    ///
    /// # Errors
    ///
    /// [`CoreError::OutOfDomain`] for a pair outside ±90 / ±180.
    pub fn from_lat_lon(pairs: &[(f64, f64)]) -> PointsResult<Self> {
        let points = pairs
            .iter()
            .map(|&(lat, lon)| {
                let geo = GeoPoint::new(lat, lon);
                if geo.is_valid() {
                    Ok(Point::from(geo))
                } else {
                    Err(CoreError::OutOfDomain { x: lon, y: lat, crs: Crs::Wgs84 })
                }
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self::from_points(points, Crs::Wgs84))
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn crs(&self) -> Crs {
        self.crs.clone()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn coords(&self) -> Vec<Coord<f64>> {
        self.points.iter().map(|p| p.coord).collect()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    // ── Combination ───────────────────────────────────────────────────────

    /// `self` followed by `other`.  Both must share one CRS.
    pub fn concat(&self, other: &CoordinateSet) -> PointsResult<CoordinateSet> {
        if self.crs != other.crs {
            return Err(PointsError::CrsMismatch { expected: self.crs(), found: other.crs() });
        }
        let mut points = Vec::with_capacity(self.len() + other.len());
        points.extend_from_slice(&self.points);
        points.extend_from_slice(&other.points);
        Ok(Self::from_points(points, self.crs()))
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    pub fn multi_point(&self) -> MultiPoint<f64> {
        self.points.iter().map(|p| geo::Point::from(p.coord)).collect()
    }

    /// Convex hull of every point, in the set's CRS.
    pub fn convex_hull(&self) -> PointsResult<Polygon<f64>> {
        if self.is_empty() {
            return Err(PointsError::Empty);
        }
        Ok(self.multi_point().convex_hull())
    }

    /// Convex hull grown outwards by `buffer` CRS units.
    ///
    /// Each hull vertex is replaced by a ring of radius `buffer` before the
    /// hull is taken again, so the result is convex and covers every point
    /// with at least `buffer` clearance (minus the polygonal approximation
    /// of the corners).
    pub fn extent(&self, buffer: f64) -> PointsResult<Polygon<f64>> {
        let hull = self.convex_hull()?;
        if buffer <= 0.0 {
            return Ok(hull);
        }
        let grown: MultiPoint<f64> = hull
            .exterior()
            .coords()
            .flat_map(|c| {
                (0..BUFFER_SEGMENTS).map(move |i| {
                    let theta = TAU * i as f64 / BUFFER_SEGMENTS as f64;
                    geo::Point::new(c.x + buffer * theta.cos(), c.y + buffer * theta.sin())
                })
            })
            .collect();
        Ok(grown.convex_hull())
    }

    /// Mean position of the points.
    pub fn centroid(&self) -> PointsResult<Coord<f64>> {
        self.multi_point()
            .centroid()
            .map(|p| p.0)
            .ok_or(PointsError::Empty)
    }
}

impl Reproject for CoordinateSet {
    fn crs(&self) -> Crs {
        CoordinateSet::crs(self)
    }

    fn reproject(&self, transformer: &Transformer) -> CoreResult<Self> {
        let points = self
            .points
            .iter()
            .map(|p| {
                Ok(Point {
                    coord:   transformer.transform(p.coord)?,
                    address: p.address.clone(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self { points, crs: transformer.to().clone() })
    }
}

impl<'a> IntoIterator for &'a CoordinateSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
