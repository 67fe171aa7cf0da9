//! Lazy, single-owner cache of one street network and its derived views.
//!
//! # State machine
//!
//! ```text
//!             fetch               project
//! Unfetched ─────────▶ Fetched ───────────▶ Projected ◀──┐
//!     ▲                                       │   │      │ project(Some(t)), t ≠ crs
//!     └──────────────── clear ────────────────┘   └──────┘
//! ```
//!
//! Each fetched state owns its graph together with lazily derived node view,
//! edge view and extent.  Views live *inside* the state they were derived
//! from, so a transition that replaces the graph drops them with it; there is
//! no separate refresh step that could be forgotten.
//!
//! | Call                     | Unfetched     | Fetched                      | Projected                  |
//! |--------------------------|---------------|------------------------------|----------------------------|
//! | `fetch(_)`               | backend call  | cached graph                 | cached graph               |
//! | `project(None)`          | `NotFetched`  | reproject to centroid UTM    | no-op                      |
//! | `project(Some(t))`       | `NotFetched`  | reproject unless `t == crs`  | reproject unless `t == crs`|
//! | `nodes()` / `edges()`    | `NotFetched`  | derive once                  | derive once                |
//!
//! Mutating calls take `&mut self`; sharing one cache across threads needs an
//! outer `Mutex`.

use std::sync::{Arc, OnceLock};

use geo::{Centroid, ConvexHull, MultiPoint, Polygon};
use tracing::{debug, info};

use sn_core::{Crs, GeoPoint, Reproject, Transformer};

use crate::{
    EdgeView, ExtentDescriptor, GraphBackend, NetworkError, NetworkGraph, NetworkResult, NodeView,
};

// ── Cached state ──────────────────────────────────────────────────────────────

/// One graph plus everything derived from it.
struct CachedGraph {
    graph:  Arc<NetworkGraph>,
    nodes:  OnceLock<NodeView>,
    edges:  OnceLock<EdgeView>,
    extent: OnceLock<Polygon<f64>>,
}

impl CachedGraph {
    fn new(graph: Arc<NetworkGraph>) -> Self {
        Self {
            graph,
            nodes:  OnceLock::new(),
            edges:  OnceLock::new(),
            extent: OnceLock::new(),
        }
    }
}

enum CacheState {
    Unfetched,
    Fetched(CachedGraph),
    Projected(CachedGraph),
}

impl CacheState {
    fn cached(&self) -> Option<&CachedGraph> {
        match self {
            CacheState::Unfetched => None,
            CacheState::Fetched(c) | CacheState::Projected(c) => Some(c),
        }
    }

    fn cached_mut(&mut self) -> Option<&mut CachedGraph> {
        match self {
            CacheState::Unfetched => None,
            CacheState::Fetched(c) | CacheState::Projected(c) => Some(c),
        }
    }
}

// ── NetworkCache ──────────────────────────────────────────────────────────────

/// Owns at most one street network, fetched through `B` at most once.
pub struct NetworkCache<B> {
    backend: B,
    state:   CacheState,
}

impl<B: GraphBackend> NetworkCache<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, state: CacheState::Unfetched }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Fetch the network for `descriptor`, or return the cached one.
    ///
    /// Once a graph is cached every later call returns it, whatever the
    /// descriptor.  `Custom` descriptors call their closure instead of the
    /// backend.
    ///
    /// # Errors
    ///
    /// Whatever the backend or closure returns (typically
    /// [`NetworkError::Retrieval`]); nothing is cached on failure.
    pub fn fetch(&mut self, descriptor: &ExtentDescriptor) -> NetworkResult<Arc<NetworkGraph>> {
        if let Some(cached) = self.state.cached() {
            debug!(kind = descriptor.kind(), "network already cached; descriptor ignored");
            return Ok(Arc::clone(&cached.graph));
        }
        let graph = match descriptor {
            ExtentDescriptor::Custom(fetch) => fetch()?,
            other => self.backend.fetch(other)?,
        };
        info!(
            kind = descriptor.kind(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            crs = %graph.crs(),
            "fetched street network"
        );
        let graph = Arc::new(graph);
        self.state = CacheState::Fetched(CachedGraph::new(Arc::clone(&graph)));
        Ok(graph)
    }

    /// Reproject the cached graph.
    ///
    /// `None` means "the UTM zone of the graph's centroid", and is a no-op
    /// once any projection has happened.  `Some(t)` is a no-op when the graph
    /// is already in `t`.  A no-op keeps the derived views; a real
    /// reprojection drops them.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::NotFetched`] before the first successful `fetch`.
    /// - [`NetworkError::EmptyGraph`] for `None` on a graph without nodes.
    /// - [`NetworkError::Core`] if a position falls outside the target CRS;
    ///   the cache is left unchanged.
    pub fn project(&mut self, target: Option<Crs>) -> NetworkResult<Arc<NetworkGraph>> {
        let (graph, projected) = match &self.state {
            CacheState::Unfetched => return Err(NetworkError::NotFetched),
            CacheState::Fetched(c) => (Arc::clone(&c.graph), false),
            CacheState::Projected(c) => (Arc::clone(&c.graph), true),
        };

        let target = match target {
            Some(t) => t,
            None if projected => {
                debug!(crs = %graph.crs(), "graph already projected");
                return Ok(graph);
            }
            None => default_projection(&graph)?,
        };

        if target == graph.crs() {
            debug!(crs = %target, "graph already in target CRS");
            self.state = match std::mem::replace(&mut self.state, CacheState::Unfetched) {
                CacheState::Fetched(c) => CacheState::Projected(c),
                other => other,
            };
            return Ok(graph);
        }

        let transformer = Transformer::new(graph.crs(), target)?;
        let reprojected = Arc::new(graph.reproject(&transformer)?);
        info!(
            from = %transformer.from(),
            to = %transformer.to(),
            nodes = reprojected.node_count(),
            "projected street network"
        );
        self.state = CacheState::Projected(CachedGraph::new(Arc::clone(&reprojected)));
        Ok(reprojected)
    }

    /// Drop the cached graph and everything derived from it.
    pub fn clear(&mut self) {
        self.state = CacheState::Unfetched;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn is_fetched(&self) -> bool {
        self.state.cached().is_some()
    }

    pub fn is_projected(&self) -> bool {
        matches!(self.state, CacheState::Projected(_))
    }

    /// CRS of the cached graph, if any.
    pub fn crs(&self) -> Option<Crs> {
        self.state.cached().map(|c| c.graph.crs())
    }

    pub fn graph(&self) -> NetworkResult<&Arc<NetworkGraph>> {
        self.cached().map(|c| &c.graph)
    }

    /// Node view of the current graph, derived on first use.
    pub fn nodes(&self) -> NetworkResult<&NodeView> {
        let cached = self.cached()?;
        Ok(cached.nodes.get_or_init(|| {
            debug!("deriving node view");
            NodeView::from_graph(&cached.graph)
        }))
    }

    /// Edge view of the current graph, derived on first use.
    pub fn edges(&self) -> NetworkResult<&EdgeView> {
        let cached = self.cached()?;
        Ok(cached.edges.get_or_init(|| {
            debug!("deriving edge view");
            EdgeView::from_graph(&cached.graph)
        }))
    }

    /// Convex hull of every edge endpoint (of every node if there are no
    /// edges), in the graph's CRS.
    pub fn extent(&self) -> NetworkResult<&Polygon<f64>> {
        let cached = self.cached()?;
        if let Some(extent) = cached.extent.get() {
            return Ok(extent);
        }
        let extent = graph_extent(&cached.graph)?;
        Ok(cached.extent.get_or_init(|| extent))
    }

    /// Coerce list-valued attribute columns of both views to text, deriving
    /// the views first if needed.  Runs once per graph state; returns the
    /// number of columns rewritten.
    pub fn make_hashable(&mut self) -> NetworkResult<usize> {
        let cached = self.state.cached_mut().ok_or(NetworkError::NotFetched)?;
        let graph = Arc::clone(&cached.graph);
        cached.nodes.get_or_init(|| NodeView::from_graph(&graph));
        cached.edges.get_or_init(|| EdgeView::from_graph(&graph));

        let mut rewritten = 0;
        if let Some(nodes) = cached.nodes.get_mut() {
            rewritten += nodes.attrs.make_hashable();
        }
        if let Some(edges) = cached.edges.get_mut() {
            rewritten += edges.attrs.make_hashable();
        }
        if rewritten > 0 {
            debug!(columns = rewritten, "sanitized unhashable view columns");
        }
        Ok(rewritten)
    }

    fn cached(&self) -> NetworkResult<&CachedGraph> {
        self.state.cached().ok_or(NetworkError::NotFetched)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// UTM CRS of the zone containing the centroid of the graph's nodes.
fn default_projection(graph: &NetworkGraph) -> NetworkResult<Crs> {
    let centroid = graph
        .positions()
        .iter()
        .map(|&c| geo::Point::from(c))
        .collect::<MultiPoint<f64>>()
        .centroid()
        .ok_or(NetworkError::EmptyGraph)?;
    let geographic = Transformer::new(graph.crs(), Crs::Wgs84)?.transform(centroid.0)?;
    Ok(GeoPoint::from_coord(geographic).utm_crs())
}

fn graph_extent(graph: &NetworkGraph) -> NetworkResult<Polygon<f64>> {
    if graph.is_empty() {
        return Err(NetworkError::EmptyGraph);
    }
    let points: MultiPoint<f64> = if graph.edge_count() > 0 {
        graph
            .edge_from
            .iter()
            .chain(&graph.edge_to)
            .filter_map(|&n| graph.node_pos(n))
            .map(geo::Point::from)
            .collect()
    } else {
        graph.positions().iter().map(|&c| geo::Point::from(c)).collect()
    };
    Ok(points.convex_hull())
}
