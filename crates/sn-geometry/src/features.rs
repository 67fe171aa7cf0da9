//! Auxiliary map features (buildings, parks, amenities…) around a route.
//!
//! A [`FeatureBackend`] answers tag queries for an area and returns WGS84
//! collections; the pipeline reprojects them into the graph CRS before
//! caching.

use geo::Polygon;

use sn_core::GeoPoint;

use crate::{GeometryCollection, GeometryError, GeometryResult};

/// Which tag values a query accepts for one key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagMatch {
    /// Any value, e.g. `building=*`.
    Any,
    Values(Vec<String>),
}

/// A union of key/value conditions: a feature matches if any condition does.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagQuery {
    conditions: Vec<(String, TagMatch)>,
}

impl TagQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match features carrying `key` with any value.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.conditions.push((key.into(), TagMatch::Any));
        self
    }

    /// Match features whose `key` is one of `values`.
    pub fn values<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions.push((key.into(), TagMatch::Values(values)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, TagMatch)] {
        &self.conditions
    }

    pub fn matches(&self, tags: &[(&str, &str)]) -> bool {
        self.conditions.iter().any(|(key, want)| {
            tags.iter().any(|(k, v)| {
                *k == key.as_str()
                    && match want {
                        TagMatch::Any => true,
                        TagMatch::Values(vals) => vals.iter().any(|x| x.as_str() == *v),
                    }
            })
        })
    }
}

/// Pluggable source of tagged map features.
pub trait FeatureBackend {
    /// Features within `dist_m` metres of `center`.
    fn features_from_point(&self, center: GeoPoint, tags: &TagQuery, dist_m: f64) -> GeometryResult<GeometryCollection>;

    /// Features inside `polygon` (WGS84).
    fn features_from_polygon(&self, polygon: &Polygon<f64>, tags: &TagQuery) -> GeometryResult<GeometryCollection>;
}

/// Backend for pipelines that never ask for features.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFeatures;

impl FeatureBackend for NoFeatures {
    fn features_from_point(&self, _: GeoPoint, _: &TagQuery, _: f64) -> GeometryResult<GeometryCollection> {
        Err(GeometryError::Retrieval("no feature backend configured".into()))
    }

    fn features_from_polygon(&self, _: &Polygon<f64>, _: &TagQuery) -> GeometryResult<GeometryCollection> {
        Err(GeometryError::Retrieval("no feature backend configured".into()))
    }
}
