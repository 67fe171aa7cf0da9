//! OSM PBF graph backend — enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use sn_network::osm::OsmPbfBackend;
//! use sn_network::{ExtentDescriptor, NetworkCache};
//!
//! let mut cache = NetworkCache::new(OsmPbfBackend::new("alabama-latest.osm.pbf"));
//! cache.fetch(&ExtentDescriptor::BBox { north: 30.72, south: 30.66, east: -88.02, west: -88.10 })?;
//! ```
//!
//! # What is loaded
//!
//! Only drivable `highway=*` ways are kept (see [`is_drivable`]), and of
//! those only segments whose two nodes both fall inside the requested area.
//! One-way roads add a single directed edge; two-way roads add both.  Edge
//! lengths are haversine metres; positions are WGS84.
//!
//! `Address` and `Place` descriptors need a geocoder and are rejected; turn
//! them into `Point` or `Polygon` descriptors first.

use std::path::PathBuf;

use geo::{Contains, Polygon, Rect};
use osmpbf::{Element, ElementReader};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::info;

use sn_core::{AttrValue, Crs, GeoPoint};

use crate::{ExtentDescriptor, GraphBackend, NetworkError, NetworkGraph, NetworkGraphBuilder, NetworkResult};

// ── Public entry point ────────────────────────────────────────────────────────

/// Reads street networks out of a local `.osm.pbf` extract.
#[derive(Clone, Debug)]
pub struct OsmPbfBackend {
    path: PathBuf,
}

impl OsmPbfBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GraphBackend for OsmPbfBackend {
    fn fetch(&self, descriptor: &ExtentDescriptor) -> NetworkResult<NetworkGraph> {
        let area = Area::from_descriptor(descriptor)?;
        load_from_pbf(&self.path, &area)
    }
}

// ── Area filter ───────────────────────────────────────────────────────────────

enum Area {
    Rect(Rect<f64>),
    Polygon(Polygon<f64>),
    Circle { center: GeoPoint, radius_m: f64 },
}

impl Area {
    fn from_descriptor(descriptor: &ExtentDescriptor) -> NetworkResult<Self> {
        match descriptor {
            ExtentDescriptor::BBox { north, south, east, west } => Ok(Area::Rect(Rect::new(
                geo::coord! { x: *west, y: *south },
                geo::coord! { x: *east, y: *north },
            ))),
            ExtentDescriptor::Polygon(p) => Ok(Area::Polygon(p.clone())),
            ExtentDescriptor::Point { center, distance_m } => {
                Ok(Area::Circle { center: *center, radius_m: *distance_m })
            }
            other => Err(NetworkError::Retrieval(format!(
                "OSM PBF backend cannot resolve {} descriptors",
                other.kind()
            ))),
        }
    }

    fn contains(&self, p: GeoPoint) -> bool {
        let pt = geo::Point::from(p.to_coord());
        match self {
            // Rect::contains excludes the boundary; bbox queries include it.
            Area::Rect(r) => {
                let (min, max) = (r.min(), r.max());
                (min.x..=max.x).contains(&p.lon) && (min.y..=max.y).contains(&p.lat)
            }
            Area::Polygon(poly) => poly.contains(&pt),
            Area::Circle { center, radius_m } => center.distance_m(p) <= *radius_m,
        }
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

fn load_from_pbf(path: &std::path::Path, area: &Area) -> NetworkResult<NetworkGraph> {
    if !path.is_file() {
        return Err(NetworkError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    // ── Phase 1: in-area nodes + drivable ways in one sequential pass ─────
    let reader = ElementReader::from_path(path).map_err(|e| NetworkError::Osm(e.to_string()))?;

    let mut in_area: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    let mut road_ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                let p = GeoPoint::new(n.lat(), n.lon());
                if area.contains(p) {
                    in_area.insert(n.id(), p);
                }
            }
            Element::DenseNode(n) => {
                let p = GeoPoint::new(n.lat(), n.lon());
                if area.contains(p) {
                    in_area.insert(n.id(), p);
                }
            }
            Element::Way(w) => {
                let tags: Vec<(&str, &str)> = w.tags().collect();
                let tag = |key: &str| tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
                if let Some(highway) = tag("highway").filter(|h| is_drivable(h)) {
                    road_ways.push(OsmWay {
                        id:      w.id(),
                        refs:    w.refs().collect(),
                        highway: highway.to_string(),
                        name:    tag("name").map(str::to_string),
                        oneway:  is_oneway(highway, &tags),
                    });
                }
            }
            _ => {}
        })
        .map_err(|e| NetworkError::Osm(e.to_string()))?;

    // ── Phase 2: build network from in-area way segments ──────────────────
    let referenced: FxHashSet<i64> = road_ways
        .iter()
        .flat_map(|w| w.refs.iter().copied())
        .filter(|id| in_area.contains_key(id))
        .collect();
    let mut builder = NetworkGraphBuilder::with_capacity(Crs::Wgs84, referenced.len(), referenced.len() * 2);

    for way in &road_ways {
        for window in way.refs.windows(2) {
            let (Some(&a), Some(&b)) = (in_area.get(&window[0]), in_area.get(&window[1])) else {
                continue;
            };
            let from = builder.add_node(window[0] as u64, a.to_coord());
            let to = builder.add_node(window[1] as u64, b.to_coord());
            let attrs = way.edge_attrs();
            let len_m = a.distance_m(b);
            if way.oneway {
                builder.add_directed_edge_with(from, to, len_m, attrs);
            } else {
                builder.add_road_with(from, to, len_m, attrs);
            }
        }
    }

    let graph = builder.build()?;
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded OSM street network"
    );
    Ok(graph)
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    id:      i64,
    refs:    Vec<i64>,
    highway: String,
    name:    Option<String>,
    oneway:  bool,
}

impl OsmWay {
    fn edge_attrs(&self) -> Vec<(String, AttrValue)> {
        vec![
            ("osmid".to_string(), AttrValue::Int(self.id)),
            ("highway".to_string(), AttrValue::from(self.highway.as_str())),
            ("name".to_string(), self.name.as_deref().map_or(AttrValue::Null, AttrValue::from)),
            ("oneway".to_string(), AttrValue::Bool(self.oneway)),
        ]
    }
}

// ── Tag helpers ───────────────────────────────────────────────────────────────

/// `true` if this `highway` value is drivable by car.
fn is_drivable(highway: &str) -> bool {
    !matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track"
            | "bridleway" | "corridor" | "proposed" | "construction"
    )
}

/// Whether a way is one-way for car traffic.
///
/// Motorways and motorway links are implicitly one-way in OSM convention.
fn is_oneway(highway: &str, tags: &[(&str, &str)]) -> bool {
    let explicit = tags
        .iter()
        .any(|(k, v)| *k == "oneway" && matches!(*v, "yes" | "1" | "true"));
    let implicit = matches!(highway, "motorway" | "motorway_link");
    explicit || implicit
}
