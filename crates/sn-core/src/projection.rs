//! Coordinate transforms between CRSs, backed by `proj4rs`.
//!
//! Geographic systems take and return degrees (`x` = longitude, `y` =
//! latitude); `proj4rs` works in radians, so the conversion happens here at
//! the boundary.  Projected systems pass through in their own units.

use std::fmt;

use geo::Coord;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::crs::Crs;
use crate::{CoreError, CoreResult};

// ── Transformer ───────────────────────────────────────────────────────────────

/// Transforms coordinates from one CRS to another.
///
/// Building one parses both projection definitions; [`crate::CrsRegistry`]
/// keeps one per CRS pair.
pub struct Transformer {
    from: Crs,
    to:   Crs,
    src:  Proj,
    dst:  Proj,
}

impl Transformer {
    /// # Errors
    ///
    /// [`CoreError::UnknownCrs`] if either side has no usable definition.
    pub fn new(from: Crs, to: Crs) -> CoreResult<Self> {
        let src = from.to_proj()?;
        let dst = to.to_proj()?;
        Ok(Self { from, to, src, dst })
    }

    pub fn from(&self) -> &Crs {
        &self.from
    }

    pub fn to(&self) -> &Crs {
        &self.to
    }

    /// `true` if the transform leaves coordinates untouched.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }

    /// Transform one coordinate.
    ///
    /// # Errors
    ///
    /// [`CoreError::OutOfDomain`] for non-finite input, latitudes beyond the
    /// poles, points the projection rejects, or results that are not finite.
    pub fn transform(&self, c: Coord<f64>) -> CoreResult<Coord<f64>> {
        if self.is_identity() {
            return Ok(c);
        }
        let src_geographic = self.src.is_latlong();
        if !(c.x.is_finite() && c.y.is_finite()) || (src_geographic && c.y.abs() > 90.0) {
            return Err(out_of_domain(c, &self.from));
        }

        let mut p = if src_geographic {
            (c.x.to_radians(), c.y.to_radians(), 0.0)
        } else {
            (c.x, c.y, 0.0)
        };
        transform(&self.src, &self.dst, &mut p).map_err(|_| out_of_domain(c, &self.from))?;

        let out = if self.dst.is_latlong() {
            Coord { x: p.0.to_degrees(), y: p.1.to_degrees() }
        } else {
            Coord { x: p.0, y: p.1 }
        };
        if out.x.is_finite() && out.y.is_finite() {
            Ok(out)
        } else {
            Err(out_of_domain(c, &self.to))
        }
    }

    /// Transform a batch, stopping at the first failure.
    pub fn transform_all(&self, coords: &[Coord<f64>]) -> CoreResult<Vec<Coord<f64>>> {
        coords.iter().map(|&c| self.transform(c)).collect()
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

fn out_of_domain(c: Coord<f64>, crs: &Crs) -> CoreError {
    CoreError::OutOfDomain { x: c.x, y: c.y, crs: crs.clone() }
}
