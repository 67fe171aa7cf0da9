//! Network-subsystem error type.

use thiserror::Error;

use sn_core::{CoreError, Crs, NodeId};
use sn_points::PointsError;

/// Errors produced by `sn-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The graph backend failed.  Not retried.
    #[error("network retrieval failed: {0}")]
    Retrieval(String),

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("no graph has been fetched yet")]
    NotFetched,

    #[error("expected data in {expected}, found {found}")]
    CrsMismatch { expected: Crs, found: Crs },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("invalid edge {from} -> {to}: {reason}")]
    InvalidEdge { from: NodeId, to: NodeId, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),

    #[error(transparent)]
    Points(#[from] PointsError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
