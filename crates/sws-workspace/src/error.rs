//! Error types for session operations.

use std::path::PathBuf;

use sws_document::DocumentError;
use sws_model::WindowId;
use sws_table::TableError;
use thiserror::Error;

/// Errors surfaced by [`WorkspaceSession`](crate::WorkspaceSession) and settings.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Table(#[from] TableError),

    /// The window has no table payload to view.
    #[error("Window {0} has no table data")]
    NotATable(WindowId),

    /// Settings file could not be written.
    #[error("Failed to {operation} settings at {path}")]
    Settings {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings could not be encoded as TOML.
    #[error("Failed to serialize settings")]
    SettingsFormat(#[from] toml::ser::Error),
}

impl WorkspaceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Document(e) => e.user_message(),
            Self::Table(TableError::UnknownColumn { name }) => {
                format!("The table has no column named '{name}'")
            }
            Self::Table(e) => format!("The table could not be loaded: {e}"),
            Self::NotATable(id) => format!("Window #{id} does not contain a table"),
            Self::Settings { operation, path, .. } => {
                format!("Could not {} settings at {}", operation, path.display())
            }
            Self::SettingsFormat(_) => "Settings could not be saved".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Document(e) => e.suggestion(),
            Self::Table(TableError::Csv { .. }) => {
                Some("Check that the file is comma-separated with a header row.".to_string())
            }
            Self::Table(_) | Self::NotATable(_) => None,
            Self::Settings { .. } => Some("Check that the configuration directory is writable.".to_string()),
            Self::SettingsFormat(_) => None,
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, WorkspaceError>;
