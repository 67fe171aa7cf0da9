//! Batch routing over aligned origin/destination node lists.
//!
//! Every pair is routed independently.  A pair that cannot be routed becomes
//! a [`RouteFailure`] in the batch; it never aborts the other pairs.  With the
//! `parallel` feature the per-pair searches run on Rayon's thread pool and
//! results are still reported in pair order.

use tracing::{info, warn};

use sn_core::NodeId;
use sn_network::{NetworkGraph, NodeView, SnappedBatch};

use crate::path::{line_length, node_key, path_geometry};
use crate::{
    DijkstraRouter, FailureReason, PathResult, RouteBatch, RouteError, RouteFailure, RouteResult, Router,
};

// ── Config ────────────────────────────────────────────────────────────────────

/// What to do when a path's realized length disagrees with its weight sum.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DivergencePolicy {
    /// Keep the path and log a warning.
    #[default]
    Warn,
    /// Record the pair as a failure.
    Reject,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    /// Largest accepted relative gap between `route_dist` and `weight_sum`.
    pub length_tolerance: f64,
    pub on_divergence:    DivergencePolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { length_tolerance: 1e-3, on_divergence: DivergencePolicy::Warn }
    }
}

// ── RoutePlanner ──────────────────────────────────────────────────────────────

/// Routes every origin/destination pair of a batch through `R`.
#[derive(Clone, Debug, Default)]
pub struct RoutePlanner<R = DijkstraRouter> {
    router: R,
    config: PlannerConfig,
}

impl RoutePlanner<DijkstraRouter> {
    pub fn new(config: PlannerConfig) -> Self {
        Self { router: DijkstraRouter, config }
    }
}

impl<R: Router> RoutePlanner<R> {
    pub fn with_router(router: R, config: PlannerConfig) -> Self {
        Self { router, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Route `origins[i]` to `destinations[i]` for every `i`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::PairCountMismatch`] if the batches differ in length.
    /// - [`RouteError::StaleInput`] if either batch or `nodes` was computed
    ///   under a CRS the graph no longer has.
    pub fn plan(
        &self,
        graph: &NetworkGraph,
        nodes: &NodeView,
        origins: &SnappedBatch,
        destinations: &SnappedBatch,
    ) -> RouteResult<RouteBatch> {
        for batch in [origins, destinations] {
            if !batch.is_valid_for(graph) {
                return Err(RouteError::StaleInput { expected: graph.crs(), found: batch.crs() });
            }
        }
        self.plan_ids(graph, nodes, &origins.node_ids(), &destinations.node_ids())
    }

    /// [`plan`](Self::plan) over raw node ids.
    pub fn plan_ids(
        &self,
        graph: &NetworkGraph,
        nodes: &NodeView,
        origins: &[NodeId],
        destinations: &[NodeId],
    ) -> RouteResult<RouteBatch> {
        if origins.len() != destinations.len() {
            return Err(RouteError::PairCountMismatch {
                origins:      origins.len(),
                destinations: destinations.len(),
            });
        }
        if nodes.crs() != graph.crs() {
            return Err(RouteError::StaleInput { expected: graph.crs(), found: nodes.crs() });
        }

        let pairs: Vec<(NodeId, NodeId)> = origins.iter().copied().zip(destinations.iter().copied()).collect();

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<Result<PathResult, RouteFailure>> = pairs
            .iter()
            .enumerate()
            .map(|(i, &(o, d))| self.route_pair(graph, nodes, i, o, d))
            .collect();

        #[cfg(feature = "parallel")]
        let outcomes: Vec<Result<PathResult, RouteFailure>> = {
            use rayon::prelude::*;

            pairs
                .par_iter()
                .enumerate()
                .map(|(i, &(o, d))| self.route_pair(graph, nodes, i, o, d))
                .collect()
        };

        let mut paths = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(path) => paths.push(path),
                Err(failure) => failures.push(failure),
            }
        }

        info!(
            pairs = pairs.len(),
            routed = paths.len(),
            failed = failures.len(),
            crs = %graph.crs(),
            "planned route batch"
        );
        Ok(RouteBatch::new(graph.crs(), pairs, paths, failures))
    }

    fn route_pair(
        &self,
        graph: &NetworkGraph,
        nodes: &NodeView,
        pair: usize,
        origin: NodeId,
        destination: NodeId,
    ) -> Result<PathResult, RouteFailure> {
        let fail = |reason: FailureReason| RouteFailure { pair, origin, destination, reason };

        let raw = match self.router.route(graph, origin, destination) {
            Ok(raw) => raw,
            Err(RouteError::NodeNotFound(n)) => return Err(fail(FailureReason::NodeNotFound(n))),
            Err(e) => {
                warn!(pair, %origin, %destination, error = %e, "pair not routed");
                return Err(fail(FailureReason::Unreachable));
            }
        };

        let missing = || raw.nodes.iter().copied().find(|&n| nodes.get(n).is_none()).unwrap_or(origin);
        let geometry = path_geometry(nodes, &raw.nodes).ok_or_else(|| fail(FailureReason::NodeNotFound(missing())))?;
        let key = node_key(nodes, &raw.nodes).ok_or_else(|| fail(FailureReason::NodeNotFound(missing())))?;

        let path = PathResult {
            pair,
            origin,
            destination,
            route_dist: line_length(&geometry),
            weight_sum: raw.weight,
            nodes: raw.nodes,
            edges: raw.edges,
            node_key: key,
            geometry,
        };

        let divergence = path.divergence();
        if divergence > self.config.length_tolerance {
            match self.config.on_divergence {
                DivergencePolicy::Warn => warn!(
                    pair,
                    route_dist = path.route_dist,
                    weight_sum = path.weight_sum,
                    "route length diverges from weight sum"
                ),
                DivergencePolicy::Reject => {
                    return Err(fail(FailureReason::LengthDivergence {
                        route_dist: path.route_dist,
                        weight_sum: path.weight_sum,
                    }));
                }
            }
        }
        Ok(path)
    }
}
