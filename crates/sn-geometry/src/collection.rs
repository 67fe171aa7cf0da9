//! CRS-tagged geometry collections.

use std::fmt;

use geo::{Geometry, MapCoords};

use sn_core::{AttrTable, CoreResult, Crs, Reproject, Transformer};

use crate::{GeometryError, GeometryResult};

// ── ShapeKind ─────────────────────────────────────────────────────────────────

/// Coarse shape of a collection, used to pick render fields.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    Point,
    Line,
    Polygon,
    /// More than one of the above.
    Mixed,
    /// No geometries at all.
    Empty,
}

impl ShapeKind {
    pub fn of(geometry: &Geometry<f64>) -> ShapeKind {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => ShapeKind::Point,
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => ShapeKind::Line,
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => ShapeKind::Polygon,
            Geometry::GeometryCollection(gc) => {
                gc.iter().map(ShapeKind::of).fold(ShapeKind::Empty, ShapeKind::merge)
            }
        }
    }

    fn merge(self, other: ShapeKind) -> ShapeKind {
        match (self, other) {
            (ShapeKind::Empty, k) | (k, ShapeKind::Empty) => k,
            (a, b) if a == b => a,
            _ => ShapeKind::Mixed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Point => "point",
            ShapeKind::Line => "line",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Mixed => "mixed",
            ShapeKind::Empty => "empty",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ── GeometryCollection ────────────────────────────────────────────────────────

/// Geometries in one CRS with a parallel attribute table (one row each).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryCollection {
    crs:        Crs,
    geometries: Vec<Geometry<f64>>,
    pub attrs:  AttrTable,
}

impl GeometryCollection {
    /// Collection without attribute columns.
    pub fn new(crs: Crs, geometries: Vec<Geometry<f64>>) -> Self {
        let attrs = AttrTable::with_rows(geometries.len());
        Self { crs, geometries, attrs }
    }

    /// # Errors
    ///
    /// [`GeometryError::RowCount`] if `attrs` does not have one row per
    /// geometry.
    pub fn with_attrs(crs: Crs, geometries: Vec<Geometry<f64>>, attrs: AttrTable) -> GeometryResult<Self> {
        if attrs.row_count() != geometries.len() {
            return Err(GeometryError::RowCount {
                geometries: geometries.len(),
                rows:       attrs.row_count(),
            });
        }
        Ok(Self { crs, geometries, attrs })
    }

    pub fn empty(crs: Crs) -> Self {
        Self::new(crs, Vec::new())
    }

    /// CRS of every geometry in the collection.
    pub fn crs(&self) -> Crs {
        self.crs.clone()
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    pub fn get(&self, row: usize) -> Option<&Geometry<f64>> {
        self.geometries.get(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Geometry<f64>> {
        self.geometries.iter()
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.geometries
            .iter()
            .map(ShapeKind::of)
            .fold(ShapeKind::Empty, ShapeKind::merge)
    }
}

impl Reproject for GeometryCollection {
    fn crs(&self) -> Crs {
        GeometryCollection::crs(self)
    }

    fn reproject(&self, transformer: &Transformer) -> CoreResult<Self> {
        let geometries = self
            .geometries
            .iter()
            .map(|g| g.try_map_coords(|c| transformer.transform(c)))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self {
            crs: transformer.to().clone(),
            geometries,
            attrs: self.attrs.clone(),
        })
    }
}

impl<'a> IntoIterator for &'a GeometryCollection {
    type Item = &'a Geometry<f64>;
    type IntoIter = std::slice::Iter<'a, Geometry<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
