//! What area to fetch a network for, and the backend that fetches it.
//!
//! | Variant   | Area                                                |
//! |-----------|-----------------------------------------------------|
//! | `BBox`    | north/south/east/west bounds, degrees               |
//! | `Address` | within `distance_m` of a geocoded address           |
//! | `Place`   | boundary of a named place                           |
//! | `Polygon` | a WGS84 polygon                                     |
//! | `Point`   | within `distance_m` of a WGS84 position             |
//! | `Custom`  | whatever the supplied closure returns (no backend)  |
//!
//! New extent kinds are added here; call sites only ever hand a descriptor to
//! [`NetworkCache::fetch`](crate::NetworkCache::fetch).

use std::fmt;

use geo::Polygon;

use sn_core::{to_crs, Crs, GeoPoint};
use sn_points::{OdPairs, DEFAULT_EXTENT_BUFFER_DEG};

use crate::{NetworkGraph, NetworkError, NetworkResult};

/// Caller-supplied fetch function for [`ExtentDescriptor::Custom`].
pub type CustomFetch = Box<dyn Fn() -> NetworkResult<NetworkGraph>>;

pub enum ExtentDescriptor {
    BBox { north: f64, south: f64, east: f64, west: f64 },
    Address { query: String, distance_m: f64 },
    Place(String),
    Polygon(Polygon<f64>),
    Point { center: GeoPoint, distance_m: f64 },
    Custom(CustomFetch),
}

impl ExtentDescriptor {
    pub fn custom<F>(fetch: F) -> Self
    where
        F: Fn() -> NetworkResult<NetworkGraph> + 'static,
    {
        ExtentDescriptor::Custom(Box::new(fetch))
    }

    /// Buffered convex hull of every origin and destination, in WGS84.
    pub fn route_polygon(pairs: &OdPairs) -> NetworkResult<Self> {
        let geographic = to_crs(Crs::Wgs84, pairs.all_points())?;
        Ok(ExtentDescriptor::Polygon(geographic.extent(DEFAULT_EXTENT_BUFFER_DEG)?))
    }

    /// `distance_m` around the centroid of every origin and destination.
    pub fn route_point(pairs: &OdPairs, distance_m: f64) -> NetworkResult<Self> {
        let geographic = to_crs(Crs::Wgs84, pairs.all_points())?;
        let center = GeoPoint::from_coord(geographic.centroid()?);
        Ok(ExtentDescriptor::Point { center, distance_m })
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtentDescriptor::BBox { .. } => "bbox",
            ExtentDescriptor::Address { .. } => "address",
            ExtentDescriptor::Place(_) => "place",
            ExtentDescriptor::Polygon(_) => "polygon",
            ExtentDescriptor::Point { .. } => "point",
            ExtentDescriptor::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for ExtentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtentDescriptor::BBox { north, south, east, west } => f
                .debug_struct("BBox")
                .field("north", north)
                .field("south", south)
                .field("east", east)
                .field("west", west)
                .finish(),
            ExtentDescriptor::Address { query, distance_m } => f
                .debug_struct("Address")
                .field("query", query)
                .field("distance_m", distance_m)
                .finish(),
            ExtentDescriptor::Place(name) => f.debug_tuple("Place").field(name).finish(),
            ExtentDescriptor::Polygon(p) => f.debug_tuple("Polygon").field(p).finish(),
            ExtentDescriptor::Point { center, distance_m } => f
                .debug_struct("Point")
                .field("center", center)
                .field("distance_m", distance_m)
                .finish(),
            ExtentDescriptor::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ── GraphBackend ──────────────────────────────────────────────────────────────

/// Pluggable map-data source.
///
/// The returned graph may be in any CRS (commonly WGS84) as long as every
/// position in it shares that CRS.  `Custom` descriptors never reach a
/// backend.
pub trait GraphBackend {
    fn fetch(&self, descriptor: &ExtentDescriptor) -> NetworkResult<NetworkGraph>;
}

/// Backend for caches that are only ever fed `Custom` descriptors.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBackend;

impl GraphBackend for NoBackend {
    fn fetch(&self, descriptor: &ExtentDescriptor) -> NetworkResult<NetworkGraph> {
        Err(NetworkError::Retrieval(format!(
            "no graph backend configured for {} descriptors",
            descriptor.kind()
        )))
    }
}

impl<B: GraphBackend + ?Sized> GraphBackend for Box<B> {
    fn fetch(&self, descriptor: &ExtentDescriptor) -> NetworkResult<NetworkGraph> {
        (**self).fetch(descriptor)
    }
}
