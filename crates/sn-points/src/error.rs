//! Point-set error type.

use std::path::PathBuf;

use thiserror::Error;

use sn_core::{CoreError, Crs};

/// Errors produced by `sn-points`.
#[derive(Debug, Error)]
pub enum PointsError {
    /// A coordinate file could not be read or parsed.  `line` is 1-based.
    #[error("{source_name}: line {line}: {reason}")]
    Ingestion {
        source_name: String,
        line:        u64,
        reason:      String,
    },

    #[error("coordinate file {0} not found")]
    MissingFile(PathBuf),

    #[error("{origins} origins but {destinations} destinations")]
    CountMismatch { origins: usize, destinations: usize },

    #[error("cannot combine point sets in {expected} and {found}")]
    CrsMismatch { expected: Crs, found: Crs },

    #[error("point set is empty")]
    Empty,

    /// The geocoding backend failed; never retried here.
    #[error("geocoding failed: {0}")]
    Retrieval(String),

    #[error("{0} is not supported by this geocoder")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type PointsResult<T> = Result<T, PointsError>;
