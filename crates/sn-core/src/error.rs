//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so `?` works across crate boundaries.

use thiserror::Error;

use crate::Crs;

/// Errors produced by `sn-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown CRS identifier {0:?}")]
    UnknownCrs(String),

    #[error("coordinate ({x}, {y}) is outside the domain of {crs}")]
    OutOfDomain { x: f64, y: f64, crs: Crs },

    #[error("column {column:?} has {got} values, table has {expected} rows")]
    ColumnLength {
        column:   String,
        expected: usize,
        got:      usize,
    },

    #[error("column {0:?} not found")]
    UnknownColumn(String),

    #[error("column {0:?} holds unhashable values; call make_hashable first")]
    UnhashableColumn(String),

    #[error("row {row} out of range for table of {len} rows")]
    RowOutOfRange { row: usize, len: usize },
}

/// Shorthand result type for `sn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
