//! Error types for classilist-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in classilist-core
#[derive(Debug, Error)]
pub enum Error {
    /// Row does not carry one cell per column
    #[error("Row '{key}' has {actual} cells, table has {expected} columns")]
    CellCountMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (count: {1})")]
    ColumnOutOfBounds(usize, usize),

    /// The row source failed to produce the next row
    #[error("Row source error: {0}")]
    Source(String),
}

impl Error {
    /// Create a row source error with a message
    pub fn row_source<S: Into<String>>(msg: S) -> Self {
        Error::Source(msg.into())
    }
}
