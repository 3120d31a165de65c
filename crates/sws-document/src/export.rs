//! Workspace export.
//!
//! Turns a [`RegistrySnapshot`] into notebook bytes: a summary cell, an
//! optional debug cell, one code cell per window, and the `workspace_export`
//! metadata block carrying the structured window list.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use sws_model::{ModelError, RegistrySnapshot, WindowKind, WindowRecord, WorkspaceStats};

use crate::error::{DocumentError, Result};
use crate::metadata::{DebugInfo, ExportMetadata, FORMAT_VERSION, fingerprint, resident_memory_bytes};
use crate::notebook::{Cell, EXTENSION_KEY, Notebook, SPATIAL_CELL_KEY, WINDOW_CELL_KEY};
use crate::spatial::spatial_value;

/// Options controlling what an export contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Append a machine-parsable diagnostics cell and metadata block.
    pub include_debug_info: bool,
    /// Include the export time and per-window timestamps in cell text.
    pub include_timestamps: bool,
    /// Prefix each window cell with a position/size/content-length preamble.
    pub include_window_metrics: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_debug_info: false,
            include_timestamps: true,
            include_window_metrics: true,
        }
    }
}

/// Builds workspace documents from registry snapshots.
#[derive(Debug, Clone)]
pub struct DocumentExporter {
    app_version: String,
    device_class: String,
}

impl Default for DocumentExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExporter {
    /// Exporter identifying itself with this crate's version and the host platform.
    pub fn new() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            device_class: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }

    #[must_use]
    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    #[must_use]
    pub fn with_device_class(mut self, device_class: impl Into<String>) -> Self {
        self.device_class = device_class.into();
        self
    }

    /// Export a snapshot to document bytes, stamped with the current time.
    pub fn export(&self, snapshot: &RegistrySnapshot, options: &ExportOptions) -> Result<Vec<u8>> {
        self.export_at(snapshot, options, Utc::now())
    }

    /// Export a snapshot to document bytes, stamped with `now`.
    pub fn export_at(
        &self,
        snapshot: &RegistrySnapshot,
        options: &ExportOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<u8>> {
        let notebook = self.build_notebook(snapshot, options, now)?;
        let bytes = notebook.encode()?;
        tracing::info!(
            windows = snapshot.len(),
            cells = notebook.cells.len(),
            bytes = bytes.len(),
            "workspace exported"
        );
        Ok(bytes)
    }

    /// Export on the blocking pool so large snapshots don't stall the caller.
    pub async fn export_async(
        &self,
        snapshot: RegistrySnapshot,
        options: ExportOptions,
    ) -> Result<Vec<u8>> {
        let exporter = self.clone();
        tokio::task::spawn_blocking(move || exporter.export(&snapshot, &options))
            .await
            .map_err(|e| DocumentError::Worker(e.to_string()))?
    }

    /// Build the notebook structure without encoding it.
    pub fn build_notebook(
        &self,
        snapshot: &RegistrySnapshot,
        options: &ExportOptions,
        now: DateTime<Utc>,
    ) -> Result<Notebook> {
        check_consistency(snapshot)?;
        let stats = snapshot.stats();

        let mut notebook = Notebook::new();
        let export_time = options.include_timestamps.then_some(now);
        notebook
            .cells
            .push(Cell::markdown("workspace-summary", summary_markdown(&stats, export_time)));

        let debug = options
            .include_debug_info
            .then(|| self.debug_info(&stats, now));
        if let Some(debug) = &debug {
            notebook
                .cells
                .push(Cell::markdown("workspace-debug", debug_markdown(debug)?));
        }

        for window in &snapshot.windows {
            notebook.cells.push(window_cell(window, options));
        }

        let windows = snapshot
            .windows
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DocumentError::Serialization {
                source: Box::new(e),
            })?;

        let metadata = ExportMetadata {
            format_version: FORMAT_VERSION.to_string(),
            export_date: now,
            total_windows: snapshot.len(),
            fingerprint: Some(fingerprint(&windows)?),
            windows,
            window_types: stats.per_kind.keys().map(|k| k.as_str().to_string()).collect(),
            tags: stats.tags.iter().cloned().collect(),
            debug,
        };

        notebook.metadata.kernelspec = Some(json!({
            "display_name": "Python 3",
            "language": "python",
            "name": "python3",
        }));
        notebook.metadata.language_info = Some(json!({ "name": "python" }));
        notebook.metadata.workspace_export =
            Some(serde_json::to_value(&metadata).map_err(|e| DocumentError::Serialization {
                source: Box::new(e),
            })?);

        tracing::debug!(key = EXTENSION_KEY, "extension metadata attached");
        Ok(notebook)
    }

    fn debug_info(&self, stats: &WorkspaceStats, now: DateTime<Utc>) -> DebugInfo {
        DebugInfo {
            timestamp: now,
            total_windows: stats.total_windows,
            per_kind: stats
                .per_kind
                .iter()
                .map(|(kind, count)| (kind.as_str().to_string(), *count))
                .collect(),
            memory_bytes: resident_memory_bytes(),
            app_version: self.app_version.clone(),
            device_class: self.device_class.clone(),
        }
    }
}

/// Default file name for an export taken at `now`.
pub fn suggested_file_name(now: DateTime<Utc>) -> String {
    format!("workspace_{}.ipynb", now.format("%Y%m%d_%H%M%S"))
}

fn check_consistency(snapshot: &RegistrySnapshot) -> Result<()> {
    let mut seen = BTreeSet::new();
    for window in &snapshot.windows {
        if !seen.insert(window.id) {
            return Err(DocumentError::InconsistentSnapshot {
                id: window.id,
                source: ModelError::DuplicateId(window.id),
            });
        }
        window
            .validate()
            .map_err(|source| DocumentError::InconsistentSnapshot {
                id: window.id,
                source,
            })?;
    }
    Ok(())
}

// =============================================================================
// CELL RENDERING
// =============================================================================

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Summary cell text: window counts grouped by kind.
pub(crate) fn summary_markdown(stats: &WorkspaceStats, exported_at: Option<DateTime<Utc>>) -> String {
    let mut lines = vec!["# Workspace Export".to_string(), String::new()];
    if let Some(at) = exported_at {
        lines.push(format!("Exported: {}", timestamp(at)));
        lines.push(String::new());
    }
    lines.push(format!("Windows: {}", stats.total_windows));
    for kind in WindowKind::ALL {
        let count = stats.count(kind);
        if count > 0 {
            lines.push(format!("- {}: {count}", kind.display_name()));
        }
    }
    lines.push(String::new());
    lines.push(format!("Tags: {}", stats.tags.len()));
    lines.join("\n")
}

fn debug_markdown(debug: &DebugInfo) -> Result<String> {
    let body = serde_json::to_string_pretty(debug).map_err(|e| DocumentError::Serialization {
        source: Box::new(e),
    })?;
    Ok(format!("## Debug Information\n\n```json\n{body}\n```"))
}

/// Window cell text: header, optional metrics preamble, then the content verbatim.
pub(crate) fn window_source(window: &WindowRecord, options: &ExportOptions) -> String {
    let mut out = format!("# {} #{}\n", window.kind.display_name(), window.id);

    if options.include_window_metrics {
        let p = &window.position;
        let _ = writeln!(out, "# position: x={:.3}, y={:.3}, z={:.3}", p.x, p.y, p.z);
        match p.depth {
            Some(depth) => {
                let _ = writeln!(out, "# size: {:.1} x {:.1} x {:.1}", p.width, p.height, depth);
            }
            None => {
                let _ = writeln!(out, "# size: {:.1} x {:.1}", p.width, p.height);
            }
        }
        if options.include_timestamps {
            let _ = writeln!(out, "# created: {}", timestamp(window.created_at));
            let _ = writeln!(out, "# modified: {}", timestamp(window.last_modified));
        }
        if !window.tags.is_empty() {
            let tags: Vec<&str> = window.tags.iter().map(String::as_str).collect();
            let _ = writeln!(out, "# tags: {}", tags.join(", "));
        }
        let _ = writeln!(out, "# content length: {}", window.content.len());
        out.push('\n');
    }

    out.push_str(&window.content);
    out
}

fn window_cell(window: &WindowRecord, options: &ExportOptions) -> Cell {
    let p = &window.position;
    let mut metadata = Map::new();
    metadata.insert(
        WINDOW_CELL_KEY.to_string(),
        json!({ "id": window.id, "kind": window.kind }),
    );
    metadata.insert(SPATIAL_CELL_KEY.to_string(), spatial_value(&window.position));

    Cell::code(
        format!("window-{}", window.id),
        window_source(window, options),
        metadata,
    )
}
