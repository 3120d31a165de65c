//! Error types for table operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the table cache, search and CSV ingestion.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TableError {
    /// Sort or lookup on a column the frame doesn't have.
    #[error("Unknown column '{name}'")]
    UnknownColumn { name: String },

    /// Failed to parse CSV input.
    #[error("Failed to read CSV: {source}")]
    Csv {
        /// Set when reading from a file.
        path: Option<PathBuf>,
        #[source]
        source: csv::Error,
    },

    /// Failed to open a CSV file.
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A background load or scan panicked.
    #[error("Background table task failed: {0}")]
    WorkerFailed(String),
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
