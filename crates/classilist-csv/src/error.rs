//! Writer error types

use thiserror::Error;

/// Result type for writer operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur while writing a table
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No column is named `Prediction (<class column>)`
    #[error("Predicted column name not correct: no column named 'Prediction (<class column>)'")]
    PredictedColumnMissing,

    /// No column carries the class column name
    #[error("Actual classified column '{class_column}' does not exist")]
    ActualClassMissing { class_column: String },

    /// Every column has a classification role
    #[error("Features do not exist")]
    NoFeatureColumns,

    /// No column is named `P (<class column>=<class>)`
    #[error("Class probabilities do not exist for class column '{class_column}'")]
    NoProbabilityColumns { class_column: String },

    /// Write was cancelled between rows
    #[error("Writing cancelled after {rows_written} rows")]
    Cancelled { rows_written: u64 },

    /// Output encoding label is not known
    #[error("Unknown character encoding: {0}")]
    UnknownEncoding(String),

    /// Encoding is known but cannot be produced by the writer
    #[error("Character encoding '{0}' cannot be used for output")]
    UnsupportedEncoding(String),

    /// Settings are invalid or inconsistent
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core error (row source failures)
    #[error("Core error: {0}")]
    Core(#[from] classilist_core::Error),
}

impl CsvError {
    /// Check if this is a cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CsvError::Cancelled { .. })
    }

    /// Check if this is a header-derivation failure raised before any output
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            CsvError::PredictedColumnMissing
                | CsvError::ActualClassMissing { .. }
                | CsvError::NoFeatureColumns
                | CsvError::NoProbabilityColumns { .. }
        )
    }
}
