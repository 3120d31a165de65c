//! Document error types.
//!
//! Every codec and storage operation returns structured errors that carry a
//! user-facing message and, where one exists, a remediation hint. Per-record
//! problems are not errors: they are reported in [`crate::ParseOutcome`].

use std::path::PathBuf;

use sws_model::{ModelError, WindowId};
use thiserror::Error;

/// Document codec or storage error.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a readable notebook container.
    #[error("Malformed workspace document: {reason}")]
    Malformed { reason: String },

    /// The document was written by a newer exporter.
    #[error("Document format version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion { found: String, max_supported: String },

    /// The snapshot handed to the exporter breaks a model invariant.
    #[error("Snapshot cannot be exported: window {id}: {source}")]
    InconsistentSnapshot {
        id: WindowId,
        #[source]
        source: ModelError,
    },

    /// Serialization error.
    #[error("Failed to serialize workspace document")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No stored document with this name.
    #[error("Document not found: {name}")]
    NotFound { name: String },

    /// Document names must be plain file names.
    #[error("Invalid document name: {name}")]
    InvalidName { name: String },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A layout edit named a cell the document does not have.
    #[error("Cell {index} is out of range (document has {total} cells)")]
    CellOutOfRange { index: usize, total: usize },

    /// A layout edit carried a placement that cannot be stored.
    #[error("Invalid spatial metadata: {reason}")]
    InvalidSpatial { reason: String },

    /// A background worker died before returning.
    #[error("Background task failed: {0}")]
    Worker(String),
}

impl DocumentError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::Malformed { reason } => {
                format!("The selected file is not a readable workspace document: {reason}")
            }
            Self::UnsupportedVersion {
                found,
                max_supported,
            } => {
                format!(
                    "This workspace was exported by a newer version of the application \
                    (format {found}, your version reads up to {max_supported})."
                )
            }
            Self::InconsistentSnapshot { id, .. } => {
                format!("Window #{id} is in an inconsistent state and could not be exported.")
            }
            Self::Serialization { .. } => {
                "An error occurred while writing the workspace document.".to_string()
            }
            Self::NotFound { name } => format!("The workspace '{name}' could not be found."),
            Self::InvalidName { name } => format!("'{name}' is not a valid workspace name."),
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::CellOutOfRange { index, total } => {
                format!("The document has {total} cells, so cell {index} cannot be updated.")
            }
            Self::InvalidSpatial { reason } => format!("The window layout was rejected: {reason}"),
            Self::Worker(_) => "The operation was interrupted unexpectedly.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::Malformed { .. } => Some("Browse for another file and try again.".into()),
            Self::UnsupportedVersion { .. } => Some("Update the application and retry.".into()),
            Self::InconsistentSnapshot { .. } | Self::Serialization { .. } => None,
            Self::NotFound { .. } => Some("Refresh the document list and try again.".into()),
            Self::InvalidName { .. } => {
                Some("Use a plain file name without path separators.".into())
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
            Self::CellOutOfRange { .. } => Some("Reload the document and pick an existing cell.".into()),
            Self::InvalidSpatial { .. } => {
                Some("Use finite coordinates and a non-negative size.".into())
            }
            Self::Worker(_) => Some("Try the operation again.".into()),
        }
    }

    /// Whether retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::AtomicWriteFailed { .. } | Self::NotFound { .. } | Self::Worker(_)
        )
    }
}

/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
