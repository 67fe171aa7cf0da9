//! Single-pair shortest paths: the `Router` seam and its Dijkstra default.
//!
//! # Pluggability
//!
//! [`RoutePlanner`](crate::RoutePlanner) calls routing via the [`Router`]
//! trait, so callers can swap in A*, contraction hierarchies or a
//! time-dependent model without touching the planner.
//!
//! # Cost units
//!
//! The default router minimises the sum of `edge_length_m`.  Weights are
//! non-negative by construction (the graph builder rejects negative lengths).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use tracing::debug;

use sn_core::{EdgeId, NodeId};
use sn_network::NetworkGraph;

use crate::{RouteError, RouteResult};

// ── RawPath ───────────────────────────────────────────────────────────────────

/// The result of one routing query, before geometry is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPath {
    /// Nodes visited in order, source and destination included.
    pub nodes:  Vec<NodeId>,
    /// Edges traversed in order; one fewer than `nodes`.
    pub edges:  Vec<EdgeId>,
    /// Sum of the traversed edge weights.
    pub weight: f64,
}

impl RawPath {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so one router can serve every pair
/// of a batch on Rayon worker threads (feature `parallel`).
pub trait Router: Send + Sync {
    /// Compute a minimum-weight directed path from `from` to `to`.
    ///
    /// `from == to` yields a one-node path of weight 0.
    ///
    /// # Errors
    ///
    /// - [`RouteError::NodeNotFound`] if either node is outside the graph.
    /// - [`RouteError::Unreachable`] if no directed path exists.
    fn route(&self, graph: &NetworkGraph, from: NodeId, to: NodeId) -> RouteResult<RawPath>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm over the CSR street graph, weighted by edge length.
///
/// The heap is keyed by `(cost, NodeId)` and relaxation is strict, so among
/// equal-weight paths the same one is returned on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &NetworkGraph, from: NodeId, to: NodeId) -> RouteResult<RawPath> {
        for node in [from, to] {
            if !graph.contains_node(node) {
                return Err(RouteError::NodeNotFound(node));
            }
        }
        dijkstra(graph, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

fn dijkstra(graph: &NetworkGraph, from: NodeId, to: NodeId) -> RouteResult<RawPath> {
    if from == to {
        return Ok(RawPath { nodes: vec![from], edges: vec![], weight: 0.0 });
    }

    let n = graph.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;

    // Reverse turns the max-heap into a min-heap; NodeId breaks cost ties.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), from)));

    while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
        if node == to {
            let path = reconstruct(graph, &prev_edge, from, to, cost);
            debug!(%from, %to, hops = path.edges.len(), weight = cost, "shortest path found");
            return Ok(path);
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost + graph.edge_length_m[edge.index()];

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((OrderedFloat(new_cost), neighbor)));
            }
        }
    }

    Err(RouteError::Unreachable { from, to })
}

fn reconstruct(graph: &NetworkGraph, prev_edge: &[EdgeId], from: NodeId, to: NodeId, weight: f64) -> RawPath {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        debug_assert!(e.is_valid(), "{cur} settled without a predecessor");
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| graph.edge_to[e.index()]));
    RawPath { nodes, edges, weight }
}
