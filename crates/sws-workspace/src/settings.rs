//! Application settings - persisted user preferences.
//!
//! Settings are loaded from disk at startup and saved when changed. A missing
//! or unreadable file yields defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sws_document::ExportOptions;
use sws_restore::RestoreOptions;
use sws_table::{CacheConfig, DEFAULT_YIELD_EVERY};

use crate::error::{Result, WorkspaceError};

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "SpatialWorkspaceStudio";
const APPLICATION: &str = "SWS";

/// Application settings.
///
/// Serialized to TOML and stored in the user's config directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Defaults for new exports.
    pub export: ExportOptions,

    /// Restore behavior.
    pub restore: RestoreSettings,

    /// Table window sizing.
    pub table: TableSettings,

    /// Where workspace documents live.
    pub storage: StorageSettings,
}

impl Settings {
    /// Load settings from the default path.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
                Self::default()
            }
        }
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| WorkspaceError::Settings {
                operation: "create directory for",
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        std::fs::write(path, content).map_err(|e| WorkspaceError::Settings {
            operation: "write",
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Directory holding workspace documents.
    pub fn documents_dir(&self) -> PathBuf {
        self.storage.documents_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
                .map(|dirs| dirs.data_dir().join("workspaces"))
                .unwrap_or_else(|| PathBuf::from("workspaces"))
        })
    }
}

/// Restore settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreSettings {
    /// Replace the open workspace instead of merging into it.
    pub clear_existing: bool,

    /// Pause between window activations in milliseconds.
    pub pacing_ms: u64,
}

impl Default for RestoreSettings {
    fn default() -> Self {
        Self {
            clear_existing: false,
            pacing_ms: 200,
        }
    }
}

impl From<&RestoreSettings> for RestoreOptions {
    fn from(settings: &RestoreSettings) -> Self {
        RestoreOptions {
            clear_existing: settings.clear_existing,
            pacing: Duration::from_millis(settings.pacing_ms),
        }
    }
}

/// Table window settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Rows per cached chunk.
    pub chunk_size: usize,

    /// Maximum number of chunks held in memory.
    pub max_cached_chunks: usize,

    /// Simulated load latency per 100,000 rows in milliseconds.
    pub load_delay_per_100k_rows_ms: u64,

    /// Rows scanned between cooperative yields during search.
    pub search_yield_every: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        let cache = CacheConfig::default();
        Self {
            chunk_size: cache.chunk_size,
            max_cached_chunks: cache.max_cached_chunks,
            load_delay_per_100k_rows_ms: cache.load_delay_per_100k_rows.as_millis() as u64,
            search_yield_every: DEFAULT_YIELD_EVERY,
        }
    }
}

impl From<&TableSettings> for CacheConfig {
    fn from(settings: &TableSettings) -> Self {
        CacheConfig {
            chunk_size: settings.chunk_size,
            max_cached_chunks: settings.max_cached_chunks,
            load_delay_per_100k_rows: Duration::from_millis(settings.load_delay_per_100k_rows_ms),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Overrides the platform data directory when set.
    pub documents_dir: Option<PathBuf>,
}
