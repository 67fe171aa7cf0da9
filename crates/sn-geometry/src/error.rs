//! Geometry error type.

use thiserror::Error;

use sn_core::CoreError;

/// Errors produced by `sn-geometry`.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// No cache entry under this key.
    #[error("no geometry cached under {0:?}")]
    NotFound(String),

    /// The feature backend failed; never retried here.
    #[error("feature retrieval failed: {0}")]
    Retrieval(String),

    #[error("{geometries} geometries but {rows} attribute rows")]
    RowCount { geometries: usize, rows: usize },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type GeometryResult<T> = Result<T, GeometryError>;
