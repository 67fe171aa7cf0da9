//! Routing error type.

use thiserror::Error;

use sn_core::{CoreError, Crs, NodeId};
use sn_geometry::GeometryError;
use sn_network::NetworkError;
use sn_points::PointsError;

/// Errors produced by `sn-route`.
#[derive(Debug, Error)]
pub enum RouteError {
    /// No directed path exists.  Batch planning records this per pair.
    #[error("no route from {from} to {to}")]
    Unreachable { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("{origins} origins but {destinations} destinations")]
    PairCountMismatch { origins: usize, destinations: usize },

    /// Snapped points or a node view were computed under a CRS the graph no
    /// longer has.
    #[error("input computed under {found} but graph is in {expected}")]
    StaleInput { expected: Crs, found: Crs },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Points(#[from] PointsError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type RouteResult<T> = Result<T, RouteError>;
