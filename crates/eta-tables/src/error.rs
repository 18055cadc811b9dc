//! Error types for table construction.

use thiserror::Error;

pub type TableResult<T> = Result<T, TableError>;

/// A required lookup table is missing or malformed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Table '{table}' is empty")]
    Empty { table: &'static str },

    #[error("Table '{table}' has {x_len} x samples but {y_len} y samples")]
    LengthMismatch {
        table: &'static str,
        x_len: usize,
        y_len: usize,
    },

    #[error("Table '{table}' x samples are not strictly increasing at index {index}")]
    NonMonotonic { table: &'static str, index: usize },

    #[error("Table '{table}' has a non-finite sample at index {index}")]
    NonFinite { table: &'static str, index: usize },

    #[error("Table '{table}' requires positive values, got one at index {index}")]
    NonPositive { table: &'static str, index: usize },

    #[error("Invalid track data: {what}")]
    InvalidTrack { what: &'static str },
}
