//! In-process stand-ins for the map services: a synthetic street grid, a
//! small catalogue of campus features and a landmark geocoder.
//!
//! The grid covers whatever area it is asked for, around the University of
//! South Alabama campus in Mobile, AL.

use geo::{coord, polygon, BoundingRect, Contains, Geometry, Polygon, Rect};

use sn_core::{AttrTable, AttrValue, Crs, GeoPoint};
use sn_geometry::{FeatureBackend, GeometryCollection, GeometryError, GeometryResult, TagQuery};
use sn_network::{ExtentDescriptor, GraphBackend, NetworkError, NetworkGraph, NetworkGraphBuilder, NetworkResult};
use sn_points::{Geocoder, PointsResult};

/// Distance between parallel streets, in degrees.
const SPACING_DEG: f64 = 0.004;
/// Every `AVENUE_EVERY`-th north–south street is a one-way avenue.
const AVENUE_EVERY: usize = 3;
/// Rough metres per degree of latitude.
const M_PER_DEG: f64 = 111_320.0;

// ── Street grid ───────────────────────────────────────────────────────────────

pub struct GridBackend;

impl GraphBackend for GridBackend {
    fn fetch(&self, descriptor: &ExtentDescriptor) -> NetworkResult<NetworkGraph> {
        let area = match descriptor {
            ExtentDescriptor::Polygon(p) => p
                .bounding_rect()
                .ok_or_else(|| NetworkError::Retrieval("empty polygon".into()))?,
            ExtentDescriptor::BBox { north, south, east, west } => {
                Rect::new(coord! { x: *west, y: *south }, coord! { x: *east, y: *north })
            }
            ExtentDescriptor::Point { center, distance_m } => {
                let d = distance_m / M_PER_DEG;
                Rect::new(
                    coord! { x: center.lon - d, y: center.lat - d },
                    coord! { x: center.lon + d, y: center.lat + d },
                )
            }
            other => {
                return Err(NetworkError::Retrieval(format!(
                    "grid backend cannot resolve {} descriptors",
                    other.kind()
                )));
            }
        };
        build_grid(area)
    }
}

fn build_grid(area: Rect<f64>) -> NetworkResult<NetworkGraph> {
    let cols = (area.width() / SPACING_DEG).floor() as usize + 1;
    let rows = (area.height() / SPACING_DEG).floor() as usize + 1;
    let min = area.min();
    let at = |r: usize, c: usize| GeoPoint::new(min.y + r as f64 * SPACING_DEG, min.x + c as f64 * SPACING_DEG);

    let mut b = NetworkGraphBuilder::with_capacity(Crs::Wgs84, rows * cols, rows * cols * 4);
    let mut ids = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let source_id = 9_000_000 + (r * cols + c) as u64;
            ids.push(b.add_node_with(
                source_id,
                at(r, c).to_coord(),
                vec![("highway".into(), AttrValue::from("crossing"))],
            ));
        }
    }

    for r in 0..rows {
        for c in 0..cols {
            let here = ids[r * cols + c];
            if c + 1 < cols {
                // East–west streets: two-way; the southern boundary road has
                // two classifications.
                let highway = if r == 0 {
                    AttrValue::List(vec!["secondary".into(), "residential".into()])
                } else {
                    AttrValue::from("residential")
                };
                b.add_road_with(
                    here,
                    ids[r * cols + c + 1],
                    at(r, c).distance_m(at(r, c + 1)),
                    vec![("name".into(), format!("{} Street", r + 1).into()), ("highway".into(), highway)],
                );
            }
            if r + 1 < rows {
                let len = at(r, c).distance_m(at(r + 1, c));
                let north = ids[(r + 1) * cols + c];
                if c % AVENUE_EVERY == 0 {
                    b.add_directed_edge_with(
                        here,
                        north,
                        len,
                        vec![
                            ("name".into(), format!("Avenue {}", c / AVENUE_EVERY + 1).into()),
                            ("highway".into(), "tertiary".into()),
                            ("oneway".into(), AttrValue::Bool(true)),
                        ],
                    );
                } else {
                    b.add_road_with(here, north, len, vec![("highway".into(), "residential".into())]);
                }
            }
        }
    }
    b.build()
}

// ── Features ──────────────────────────────────────────────────────────────────

struct Feature {
    tags:  &'static [(&'static str, &'static str)],
    name:  &'static str,
    shape: Polygon<f64>,
}

/// A fixed catalogue of tagged campus features.
pub struct CampusFeatures {
    catalogue: Vec<Feature>,
}

impl Default for CampusFeatures {
    fn default() -> Self {
        let square = |lat: f64, lon: f64, half: f64| {
            polygon![
                (x: lon - half, y: lat - half),
                (x: lon + half, y: lat - half),
                (x: lon + half, y: lat + half),
                (x: lon - half, y: lat + half),
                (x: lon - half, y: lat - half),
            ]
        };
        let catalogue = vec![
            Feature { tags: &[("leisure", "park")], name: "Jaguar Green", shape: square(30.6955, -88.1790, 0.0010) },
            Feature { tags: &[("leisure", "park")], name: "Arboretum Lawn", shape: square(30.6930, -88.1720, 0.0015) },
            Feature { tags: &[("leisure", "pitch")], name: "Intramural Fields", shape: square(30.6990, -88.1840, 0.0012) },
            Feature { tags: &[("building", "university")], name: "Library", shape: square(30.6962, -88.1781, 0.0003) },
            Feature { tags: &[("building", "university")], name: "Student Center", shape: square(30.6948, -88.1770, 0.0003) },
            Feature { tags: &[("building", "dormitory")], name: "Epsilon Hall", shape: square(30.7005, -88.1865, 0.0002) },
        ];
        Self { catalogue }
    }
}

impl CampusFeatures {
    fn collect<'a>(&self, hits: impl Iterator<Item = &'a Feature>) -> GeometryResult<GeometryCollection> {
        let hits: Vec<&Feature> = hits.collect();
        let mut attrs = AttrTable::with_rows(hits.len());
        attrs.insert_column("name", hits.iter().map(|f| AttrValue::from(f.name)).collect())?;
        let geometries = hits.iter().map(|f| Geometry::Polygon(f.shape.clone())).collect();
        GeometryCollection::with_attrs(Crs::Wgs84, geometries, attrs)
    }
}

impl FeatureBackend for CampusFeatures {
    fn features_from_point(&self, center: GeoPoint, tags: &TagQuery, dist_m: f64) -> GeometryResult<GeometryCollection> {
        self.collect(self.catalogue.iter().filter(|f| {
            tags.matches(f.tags)
                && f.shape.exterior().coords().any(|c| center.distance_m(GeoPoint::from_coord(*c)) <= dist_m)
        }))
    }

    fn features_from_polygon(&self, polygon: &Polygon<f64>, tags: &TagQuery) -> GeometryResult<GeometryCollection> {
        if polygon.exterior().0.is_empty() {
            return Err(GeometryError::Retrieval("empty search polygon".into()));
        }
        self.collect(
            self.catalogue
                .iter()
                .filter(|f| tags.matches(f.tags) && polygon.contains(&f.shape)),
        )
    }
}

// ── Geocoder ──────────────────────────────────────────────────────────────────

/// Names a point after the closest campus landmark.
pub struct LandmarkGeocoder {
    landmarks: Vec<(&'static str, GeoPoint)>,
}

impl Default for LandmarkGeocoder {
    fn default() -> Self {
        Self {
            landmarks: vec![
                ("Marx Library", GeoPoint::new(30.6962, -88.1781)),
                ("Student Center", GeoPoint::new(30.6948, -88.1770)),
                ("Hancock Whitney Stadium", GeoPoint::new(30.6900, -88.1690)),
                ("Epsilon Hall", GeoPoint::new(30.7005, -88.1865)),
                ("Mitchell Center", GeoPoint::new(30.6885, -88.1765)),
                ("Shelby Hall", GeoPoint::new(30.6925, -88.1850)),
            ],
        }
    }
}

impl Geocoder for LandmarkGeocoder {
    fn reverse(&self, point: GeoPoint) -> PointsResult<String> {
        let (name, dist) = self
            .landmarks
            .iter()
            .map(|(name, at)| (*name, at.distance_m(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| sn_points::PointsError::Retrieval("no landmarks".into()))?;
        Ok(format!("{dist:.0} m from {name}, Mobile, AL"))
    }
}
