//! One street graph, its geometry cache and the route pipeline around them.
//!
//! ```text
//! download ─▶ project ─▶ reproject pairs ─▶ sanitize views ─▶ snap ─▶ plan
//!                                                                      │
//!                       geometry cache ◀── shortest_path_edges/nodes ◀─┘
//! ```
//!
//! [`StreetGraph`] owns a [`NetworkCache`], a [`GeometryCache`] and a
//! [`CrsRegistry`]; nothing is shared between instances.

use std::sync::Arc;

use geo::{Centroid, Geometry, Polygon};
use tracing::{debug, info};

use sn_core::{to_crs, AttrValue, Crs, CrsRegistry, GeoPoint, NodeId};
use sn_geometry::{
    CacheEntry, FeatureBackend, GeometryCache, GeometryCollection, NoFeatures, StyleOverrides, TagQuery,
};
use sn_network::{
    EdgeView, ExtentDescriptor, GraphBackend, NetworkCache, NetworkError, NetworkGraph, NodeSnapper, NodeView,
};
use sn_points::OdPairs;

use crate::{RawPath, RouteBatch, RoutePlanner, RouteResult, Router};

/// Cache key of the routed path lines.
pub const SHORTEST_PATH_EDGES: &str = "shortest_path_edges";
/// Cache key of the snapped origin and destination nodes.
pub const SHORTEST_PATH_NODES: &str = "shortest_path_nodes";
/// Search radius of [`StreetGraph::add_features_from_point`].
pub const DEFAULT_FEATURE_DIST_M: f64 = 1000.0;

pub struct StreetGraph<B, F = NoFeatures> {
    network:    NetworkCache<B>,
    features:   F,
    geometries: GeometryCache,
    registry:   CrsRegistry,
    planner:    RoutePlanner,
}

impl<B: GraphBackend> StreetGraph<B, NoFeatures> {
    pub fn new(backend: B) -> Self {
        Self::with_features(backend, NoFeatures)
    }
}

impl<B: GraphBackend, F: FeatureBackend> StreetGraph<B, F> {
    pub fn with_features(backend: B, features: F) -> Self {
        Self {
            network:    NetworkCache::new(backend),
            features,
            geometries: GeometryCache::new(),
            registry:   CrsRegistry::new(),
            planner:    RoutePlanner::default(),
        }
    }

    pub fn with_planner(mut self, planner: RoutePlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_geometry_cache(mut self, cache: GeometryCache) -> Self {
        self.geometries = cache;
        self
    }

    // ── Network ───────────────────────────────────────────────────────────

    /// Fetch the network once; later calls return the cached graph.
    pub fn download(&mut self, descriptor: &ExtentDescriptor) -> RouteResult<Arc<NetworkGraph>> {
        Ok(self.network.fetch(descriptor)?)
    }

    /// Reproject the graph; `None` picks the UTM zone of its centroid.
    pub fn project(&mut self, crs: Option<Crs>) -> RouteResult<Arc<NetworkGraph>> {
        Ok(self.network.project(crs)?)
    }

    pub fn network(&self) -> &NetworkCache<B> {
        &self.network
    }

    pub fn graph(&self) -> RouteResult<&Arc<NetworkGraph>> {
        Ok(self.network.graph()?)
    }

    pub fn nodes(&self) -> RouteResult<&NodeView> {
        Ok(self.network.nodes()?)
    }

    pub fn edges(&self) -> RouteResult<&EdgeView> {
        Ok(self.network.edges()?)
    }

    pub fn extent(&self) -> RouteResult<&Polygon<f64>> {
        Ok(self.network.extent()?)
    }

    pub fn crs(&self) -> Option<Crs> {
        self.network.crs()
    }

    pub fn features(&self) -> &F {
        &self.features
    }

    pub fn registry(&self) -> &CrsRegistry {
        &self.registry
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Shortest directed path between two nodes of the current graph.
    pub fn shortest_path(&self, origin: NodeId, destination: NodeId) -> RouteResult<RawPath> {
        let graph = self.network.graph()?;
        self.planner.router().route(graph, origin, destination)
    }

    /// Route every pair of `pairs` and cache the result.
    ///
    /// Projects the graph (default UTM zone if not yet projected), brings
    /// `pairs` into the graph CRS, sanitizes the views, snaps both point sets
    /// and plans the batch.  The routed lines are cached under
    /// [`SHORTEST_PATH_EDGES`] and the snapped endpoint nodes under
    /// [`SHORTEST_PATH_NODES`], replacing any earlier entries for those keys.
    ///
    /// Unroutable pairs are reported in the returned batch; only failures
    /// that affect every pair are errors.
    pub fn shortest_path_with_route(
        &mut self,
        pairs: &mut OdPairs,
        edge_style: &StyleOverrides,
        node_style: &StyleOverrides,
    ) -> RouteResult<RouteBatch> {
        let graph = self.network.project(None)?;
        pairs.to_crs(&mut self.registry, graph.crs())?;
        self.network.make_hashable()?;

        let origins = NodeSnapper::snap(&graph, pairs.origins())?;
        let destinations = NodeSnapper::snap(&graph, pairs.destinations())?;
        let nodes = self.network.nodes()?;
        let batch = self.planner.plan(&graph, nodes, &origins, &destinations)?;

        let endpoints = nodes.select(&batch.endpoint_nodes())?;
        let node_geometry = node_collection(&endpoints)?;
        let edge_geometry = batch.to_geometry()?;

        self.geometries.remove(SHORTEST_PATH_EDGES);
        self.geometries.remove(SHORTEST_PATH_NODES);
        self.geometries.put_styled(SHORTEST_PATH_EDGES, edge_geometry, edge_style);
        self.geometries.put_styled(SHORTEST_PATH_NODES, node_geometry, node_style);

        info!(
            pairs = batch.pair_count(),
            routed = batch.paths().len(),
            failed = batch.failures().len(),
            "cached shortest paths"
        );
        Ok(batch)
    }

    // ── Auxiliary features ────────────────────────────────────────────────

    /// Cache features within `dist_m` of the graph extent's centroid under
    /// `key`.  No-op (and no backend call) if `key` is already cached.
    pub fn add_features_from_point(
        &mut self,
        key: &str,
        tags: &TagQuery,
        dist_m: f64,
        style: &StyleOverrides,
    ) -> RouteResult<&mut Self> {
        if self.geometries.contains(key) {
            debug!(key, "features already cached");
            return Ok(self);
        }
        let center = self.extent_wgs84()?.centroid().ok_or(NetworkError::EmptyGraph)?;
        let found = self
            .features
            .features_from_point(GeoPoint::from_coord(center.0), tags, dist_m)?;
        self.cache_features(key, found, style)
    }

    /// Cache features inside the graph extent under `key`.  No-op (and no
    /// backend call) if `key` is already cached.
    pub fn add_features_from_polygon(
        &mut self,
        key: &str,
        tags: &TagQuery,
        style: &StyleOverrides,
    ) -> RouteResult<&mut Self> {
        if self.geometries.contains(key) {
            debug!(key, "features already cached");
            return Ok(self);
        }
        let area = self.extent_wgs84()?;
        let found = self.features.features_from_polygon(&area, tags)?;
        self.cache_features(key, found, style)
    }

    pub fn geometry(&self, key: &str) -> RouteResult<&CacheEntry> {
        Ok(self.geometries.get(key)?)
    }

    pub fn geometries(&self) -> &GeometryCache {
        &self.geometries
    }

    fn extent_wgs84(&self) -> RouteResult<Polygon<f64>> {
        let extent = self.network.extent()?;
        let crs = self.network.graph()?.crs();
        let collection = GeometryCollection::new(crs, vec![Geometry::Polygon(extent.clone())]);
        let geographic = to_crs(Crs::Wgs84, collection)?;
        match geographic.geometries() {
            [Geometry::Polygon(p)] => Ok(p.clone()),
            _ => Err(NetworkError::EmptyGraph.into()),
        }
    }

    fn cache_features(
        &mut self,
        key: &str,
        found: GeometryCollection,
        style: &StyleOverrides,
    ) -> RouteResult<&mut Self> {
        let crs = self.network.graph()?.crs();
        let found = self.registry.to_crs(crs, found)?;
        info!(key, rows = found.len(), crs = %found.crs(), "cached map features");
        self.geometries.put_styled(key, found, style);
        Ok(self)
    }
}

/// Point collection of node rows with `osmid` and `street_count` columns.
fn node_collection(view: &NodeView) -> RouteResult<GeometryCollection> {
    let geometries = view
        .iter()
        .map(|row| Geometry::Point(geo::Point::from(row.coord())))
        .collect();
    let mut attrs = view.attrs.clone();
    attrs.insert_column(
        "osmid",
        view.iter().map(|r| AttrValue::Int(r.source_id as i64)).collect(),
    )?;
    attrs.insert_column(
        "street_count",
        view.iter().map(|r| AttrValue::Int(i64::from(r.street_count))).collect(),
    )?;
    Ok(GeometryCollection::with_attrs(view.crs(), geometries, attrs)?)
}
