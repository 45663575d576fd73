//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading a company dataset.
#[derive(Debug, Error)]
pub enum DataError {
    /// Dataset file does not exist
    #[error("Dataset not found: {}", path.display())]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Required columns are absent from the header row
    #[error("Schema error: missing required columns [{}]", missing.join(", "))]
    Schema {
        /// Names of the missing columns, in canonical order
        missing: Vec<String>,
    },

    /// A row holds a value that violates the record schema
    #[error("Invalid record at line {line}, column {column}: {reason}")]
    InvalidRecord {
        /// 1-based line number in the source file (header is line 1)
        line: u64,
        /// Column the offending value belongs to
        column: String,
        /// What is wrong with the value
        reason: String,
    },

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Returns true for errors caused by the dataset's shape or contents
    /// rather than by the filesystem.
    pub const fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::InvalidRecord { .. } | Self::Csv(_))
    }
}
