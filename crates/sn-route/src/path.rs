//! Per-pair route results and the batch that collects them.

use geo::{Coord, Euclidean, Geometry, Length, LineString};

use sn_core::{AttrTable, AttrValue, Crs, EdgeId, NodeId};
use sn_geometry::{GeometryCollection, GeometryResult};
use sn_network::NodeView;

// ── PathResult ────────────────────────────────────────────────────────────────

/// One realized shortest path.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// Index of the origin/destination pair this path answers.
    pub pair:        usize,
    pub origin:      NodeId,
    pub destination: NodeId,
    pub nodes:       Vec<NodeId>,
    pub edges:       Vec<EdgeId>,
    /// `source_id`s of `nodes`, e.g. `"[11, 12, 13]"`.
    pub node_key:    String,
    pub geometry:    LineString<f64>,
    /// Sum of edge weights reported by the router.
    pub weight_sum:  f64,
    /// Length of `geometry` in CRS units.
    pub route_dist:  f64,
}

impl PathResult {
    /// Relative gap between `route_dist` and `weight_sum`.
    pub fn divergence(&self) -> f64 {
        let diff = (self.route_dist - self.weight_sum).abs();
        if self.weight_sum == 0.0 {
            diff
        } else {
            diff / self.weight_sum.abs()
        }
    }
}

/// Bracketed, comma-separated `source_id`s of a node sequence.
pub fn node_key(view: &NodeView, nodes: &[NodeId]) -> Option<String> {
    let ids = nodes
        .iter()
        .map(|&n| view.get(n).map(|row| row.source_id.to_string()))
        .collect::<Option<Vec<_>>>()?;
    Some(format!("[{}]", ids.join(", ")))
}

/// Line through the view positions of `nodes`.  A one-node path becomes a
/// zero-length segment.
pub fn path_geometry(view: &NodeView, nodes: &[NodeId]) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = nodes
        .iter()
        .map(|&n| view.position(n))
        .collect::<Option<_>>()?;
    if coords.len() == 1 {
        coords.push(coords[0]);
    }
    Some(LineString::new(coords))
}

/// Euclidean length in CRS units.
pub fn line_length(line: &LineString<f64>) -> f64 {
    Euclidean.length(line)
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureReason {
    /// No directed path from origin to destination.
    Unreachable,
    NodeNotFound(NodeId),
    /// `route_dist` and `weight_sum` disagree beyond the planner tolerance.
    LengthDivergence { route_dist: f64, weight_sum: f64 },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Unreachable => f.write_str("unreachable"),
            FailureReason::NodeNotFound(n) => write!(f, "node {n} not found"),
            FailureReason::LengthDivergence { route_dist, weight_sum } => {
                write!(f, "route_dist {route_dist:.3} diverges from weight sum {weight_sum:.3}")
            }
        }
    }
}

/// A pair the planner could not route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteFailure {
    pub pair:        usize,
    pub origin:      NodeId,
    pub destination: NodeId,
    pub reason:      FailureReason,
}

// ── RouteBatch ────────────────────────────────────────────────────────────────

/// Outcome of planning a batch of pairs: every pair ends up in exactly one
/// of `paths` or `failures`, both in pair order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteBatch {
    crs:      Crs,
    pairs:    Vec<(NodeId, NodeId)>,
    paths:    Vec<PathResult>,
    failures: Vec<RouteFailure>,
}

impl RouteBatch {
    pub(crate) fn new(
        crs: Crs,
        pairs: Vec<(NodeId, NodeId)>,
        paths: Vec<PathResult>,
        failures: Vec<RouteFailure>,
    ) -> Self {
        Self { crs, pairs, paths, failures }
    }

    pub fn crs(&self) -> Crs {
        self.crs.clone()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[(NodeId, NodeId)] {
        &self.pairs
    }

    pub fn paths(&self) -> &[PathResult] {
        &self.paths
    }

    pub fn failures(&self) -> &[RouteFailure] {
        &self.failures
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Path for pair `i`, if it was routed.
    pub fn path(&self, pair: usize) -> Option<&PathResult> {
        self.paths.iter().find(|p| p.pair == pair)
    }

    /// Every origin and destination node, sorted and unique.
    pub fn endpoint_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.pairs.iter().flat_map(|&(o, d)| [o, d]).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// One line per routed pair with columns `pair`, `route_dist`,
    /// `weight_sum` and `osmids` (the path's `node_key`).
    pub fn to_geometry(&self) -> GeometryResult<GeometryCollection> {
        let mut attrs = AttrTable::with_rows(self.paths.len());
        attrs.insert_column("pair", self.paths.iter().map(|p| AttrValue::Int(p.pair as i64)).collect())?;
        attrs.insert_column("route_dist", self.paths.iter().map(|p| AttrValue::Float(p.route_dist)).collect())?;
        attrs.insert_column("weight_sum", self.paths.iter().map(|p| AttrValue::Float(p.weight_sum)).collect())?;
        attrs.insert_column("osmids", self.paths.iter().map(|p| AttrValue::Text(p.node_key.clone())).collect())?;
        let geometries = self.paths.iter().map(|p| Geometry::LineString(p.geometry.clone())).collect();
        GeometryCollection::with_attrs(self.crs(), geometries, attrs)
    }
}
