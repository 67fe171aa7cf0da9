//! Nearest-node snapping.
//!
//! The snapper never reprojects.  Callers bring points and graph into one CRS
//! first; [`NodeSnapper::snap`] refuses a set whose CRS differs from the
//! graph's.  A [`SnappedBatch`] remembers the CRS it was computed under so a
//! batch that outlived a reprojection can be detected and recomputed.

use geo::Coord;
use tracing::debug;

use sn_core::{Crs, NodeId};
use sn_points::{CoordinateSet, Point};

use crate::{NetworkError, NetworkGraph, NetworkResult};

/// A point paired with the graph node nearest to it.
#[derive(Clone, Debug, PartialEq)]
pub struct SnappedPoint {
    pub point: Point,
    pub node:  NodeId,
}

/// Snapped points in input order, tagged with the graph CRS they are valid
/// for.
#[derive(Clone, Debug, PartialEq)]
pub struct SnappedBatch {
    crs:    Crs,
    points: Vec<SnappedPoint>,
}

impl SnappedBatch {
    pub fn crs(&self) -> Crs {
        self.crs.clone()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SnappedPoint] {
        &self.points
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.points.iter().map(|p| p.node).collect()
    }

    /// `true` while `graph` is still in the CRS this batch was snapped under.
    pub fn is_valid_for(&self, graph: &NetworkGraph) -> bool {
        self.crs == graph.crs()
    }
}

/// Resolves points to their nearest graph nodes.
///
/// Distance is Euclidean in the graph's CRS units; ties go to the lowest
/// `NodeId`.  Output order always matches input order, so `origins[i]` and
/// `destinations[i]` stay paired.
pub struct NodeSnapper;

impl NodeSnapper {
    /// Nearest node to each coordinate.  Coordinates must already be in the
    /// graph's CRS.
    ///
    /// # Errors
    ///
    /// [`NetworkError::EmptyGraph`] if the graph has no nodes.
    pub fn nearest(graph: &NetworkGraph, coords: &[Coord<f64>]) -> NetworkResult<Vec<NodeId>> {
        if graph.is_empty() {
            return Err(NetworkError::EmptyGraph);
        }
        coords
            .iter()
            .map(|&c| graph.nearest_node(c).ok_or(NetworkError::EmptyGraph))
            .collect()
    }

    /// Snap every point of `set`.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::CrsMismatch`] if `set` is not in the graph's CRS.
    /// - [`NetworkError::EmptyGraph`] if the graph has no nodes.
    pub fn snap(graph: &NetworkGraph, set: &CoordinateSet) -> NetworkResult<SnappedBatch> {
        if set.crs() != graph.crs() {
            return Err(NetworkError::CrsMismatch { expected: graph.crs(), found: set.crs() });
        }
        let nodes = Self::nearest(graph, &set.coords())?;
        debug!(points = set.len(), crs = %graph.crs(), "snapped point set to graph nodes");
        let points = set
            .iter()
            .zip(nodes)
            .map(|(point, node)| SnappedPoint { point: point.clone(), node })
            .collect();
        Ok(SnappedBatch { crs: graph.crs(), points })
    }
}
