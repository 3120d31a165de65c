//! Workspace import: cheap analysis and full parsing.
//!
//! A file the user points at may not be one of ours. [`analyze`] classifies it
//! without building any window records; [`parse`] reconstructs candidates from
//! the structured list in the extension block, dropping individual broken
//! entries instead of failing the whole document.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sws_model::{WindowId, WindowKind, WindowRecord};

use crate::error::{DocumentError, Result};
use crate::metadata::{DebugInfo, ExportMetadata};
use crate::notebook::{Cell, Notebook};

/// Header information of a document written by this exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportInfo {
    pub format_version: String,
    pub export_date: DateTime<Utc>,
    pub total_windows: usize,
    pub tags: Vec<String>,
    pub fingerprint: Option<String>,
    pub debug: Option<DebugInfo>,
}

impl From<&ExportMetadata> for ExportInfo {
    fn from(metadata: &ExportMetadata) -> Self {
        Self {
            format_version: metadata.format_version.clone(),
            export_date: metadata.export_date,
            total_windows: metadata.total_windows,
            tags: metadata.tags.clone(),
            fingerprint: metadata.fingerprint.clone(),
            debug: metadata.debug.clone(),
        }
    }
}

/// Pre-flight view of a document, used to render a preview before restoring.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub total_cells: usize,
    pub code_cells: usize,
    pub markdown_cells: usize,
    pub raw_cells: usize,
    /// Cells rendering a window; always zero for foreign documents.
    pub window_cell_count: usize,
    pub kinds: BTreeSet<WindowKind>,
    /// Present only for documents produced by this exporter.
    pub export: Option<ExportInfo>,
}

impl DocumentSummary {
    fn collect(notebook: &Notebook, metadata: Option<&ExportMetadata>) -> Self {
        let mut summary = Self {
            total_cells: notebook.cells.len(),
            code_cells: 0,
            markdown_cells: 0,
            raw_cells: 0,
            window_cell_count: 0,
            kinds: BTreeSet::new(),
            export: metadata.map(ExportInfo::from),
        };
        for cell in &notebook.cells {
            match cell {
                Cell::Code(_) => summary.code_cells += 1,
                Cell::Markdown(_) => summary.markdown_cells += 1,
                Cell::Raw(_) => summary.raw_cells += 1,
            }
        }

        if let Some(metadata) = metadata {
            summary.window_cell_count = notebook.cells.iter().filter(|c| c.is_window_cell()).count();
            summary.kinds = metadata
                .window_types
                .iter()
                .filter_map(|name| name.parse::<WindowKind>().ok())
                .collect();
        }
        summary
    }

    /// A structurally valid notebook without the workspace extension.
    pub fn is_foreign(&self) -> bool {
        self.export.is_none()
    }

    /// Whether the notebook carries the workspace extension block.
    pub fn has_extension_data(&self) -> bool {
        self.export.is_some()
    }

    /// Whether restoring this document could open any window.
    pub fn is_restorable(&self) -> bool {
        self.export.as_ref().is_some_and(|e| e.total_windows > 0)
    }
}

/// A window record reconstructed from a document, not yet merged into a registry.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub record: WindowRecord,
    /// Position of the entry in the document's structured window list.
    pub source_index: usize,
}

impl CandidateRecord {
    pub fn id(&self) -> WindowId {
        self.record.id
    }

    pub fn kind(&self) -> WindowKind {
        self.record.kind
    }
}

/// A structured entry that could not be reconstructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub index: usize,
    /// The entry's id, when it was readable.
    pub id: Option<WindowId>,
    pub reason: String,
}

/// Result of a full parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub candidates: Vec<CandidateRecord>,
    pub failures: Vec<RecordFailure>,
    pub export: Option<ExportInfo>,
}

impl ParseOutcome {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_foreign(&self) -> bool {
        self.export.is_none()
    }
}

fn extension(notebook: &Notebook) -> Result<Option<ExportMetadata>> {
    notebook
        .metadata
        .workspace_export
        .as_ref()
        .map(ExportMetadata::from_value)
        .transpose()
}

/// Classify a document and summarize it without constructing window records.
pub fn analyze(bytes: &[u8]) -> Result<DocumentSummary> {
    let notebook = Notebook::decode(bytes)?;
    let metadata = extension(&notebook)?;
    let summary = DocumentSummary::collect(&notebook, metadata.as_ref());
    if summary.is_foreign() {
        tracing::info!(cells = summary.total_cells, "foreign document: no workspace extension");
    }
    Ok(summary)
}

/// Reconstruct candidate records from a document's structured window list.
///
/// Foreign documents yield an empty outcome, not an error.
pub fn parse(bytes: &[u8]) -> Result<ParseOutcome> {
    let notebook = Notebook::decode(bytes)?;
    let metadata = extension(&notebook)?;
    Ok(reconstruct_all(metadata.as_ref()))
}

/// Summary and parse outcome from a single decode.
pub fn inspect(bytes: &[u8]) -> Result<(DocumentSummary, ParseOutcome)> {
    let notebook = Notebook::decode(bytes)?;
    let metadata = extension(&notebook)?;
    let summary = DocumentSummary::collect(&notebook, metadata.as_ref());
    Ok((summary, reconstruct_all(metadata.as_ref())))
}

fn reconstruct_all(metadata: Option<&ExportMetadata>) -> ParseOutcome {
    let Some(metadata) = metadata else {
        tracing::info!("foreign document: nothing to restore");
        return ParseOutcome::default();
    };

    let mut outcome = ParseOutcome {
        export: Some(ExportInfo::from(metadata)),
        ..Default::default()
    };

    for (index, entry) in metadata.windows.iter().enumerate() {
        match reconstruct(entry) {
            Ok(record) => outcome.candidates.push(CandidateRecord {
                record,
                source_index: index,
            }),
            Err(reason) => {
                let id = entry.get("id").and_then(Value::as_u64).map(WindowId);
                tracing::warn!(index, ?id, %reason, "dropping unreadable window entry");
                outcome.failures.push(RecordFailure { index, id, reason });
            }
        }
    }

    if metadata.total_windows != metadata.windows.len() {
        tracing::warn!(
            declared = metadata.total_windows,
            found = metadata.windows.len(),
            "window count in metadata does not match structured list"
        );
    }

    tracing::info!(
        candidates = outcome.candidates.len(),
        failed = outcome.failures.len(),
        "workspace document parsed"
    );
    outcome
}

fn reconstruct(entry: &Value) -> std::result::Result<WindowRecord, String> {
    let record: WindowRecord = serde_json::from_value(entry.clone()).map_err(|e| e.to_string())?;
    record.validate().map_err(|e| e.to_string())?;
    Ok(record)
}

/// [`analyze`] on the blocking pool.
pub async fn analyze_async(bytes: Vec<u8>) -> Result<DocumentSummary> {
    tokio::task::spawn_blocking(move || analyze(&bytes))
        .await
        .map_err(|e| DocumentError::Worker(e.to_string()))?
}

/// [`parse`] on the blocking pool.
pub async fn parse_async(bytes: Vec<u8>) -> Result<ParseOutcome> {
    tokio::task::spawn_blocking(move || parse(&bytes))
        .await
        .map_err(|e| DocumentError::Worker(e.to_string()))?
}

/// [`inspect`] on the blocking pool.
pub async fn inspect_async(bytes: Vec<u8>) -> Result<(DocumentSummary, ParseOutcome)> {
    tokio::task::spawn_blocking(move || inspect(&bytes))
        .await
        .map_err(|e| DocumentError::Worker(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document_with_windows(windows: Value) -> Vec<u8> {
        let total = windows.as_array().map_or(0, Vec::len);
        serde_json::to_vec(&json!({
            "cells": [],
            "metadata": {
                "workspace_export": {
                    "format_version": "1.0",
                    "export_date": "2026-01-01T00:00:00Z",
                    "total_windows": total,
                    "windows": windows,
                    "window_types": ["chart", "hologram"],
                }
            },
            "nbformat": 4,
            "nbformat_minor": 5
        }))
        .unwrap()
    }

    fn window_json(id: u64, kind: &str) -> Value {
        json!({
            "id": id,
            "kind": kind,
            "position": {"x": 0.0, "y": 0.0, "z": 0.0, "width": 100.0, "height": 100.0},
            "created_at": "2026-01-01T00:00:00Z",
            "last_modified": "2026-01-01T00:00:00Z",
        })
    }

    #[test]
    fn test_parse_drops_mismatched_payload() {
        let mut bad = window_json(2, "tabular_frame");
        bad["payload"] = json!({"type": "chart", "data": {"x_values": [], "y_values": []}});
        let bytes = document_with_windows(json!([window_json(1, "chart"), bad]));

        let outcome = parse(&bytes).unwrap();
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].id(), WindowId(1));
        assert_eq!(outcome.failed_count(), 1);
        assert_eq!(outcome.failures[0].id, Some(WindowId(2)));
        assert_eq!(outcome.failures[0].index, 1);
    }

    #[test]
    fn test_parse_drops_missing_fields_and_unknown_kinds() {
        let mut missing = window_json(3, "chart");
        missing.as_object_mut().unwrap().remove("position");
        let bytes = document_with_windows(json!([
            missing,
            window_json(4, "hologram"),
            window_json(5, "point_cloud"),
        ]));

        let outcome = parse(&bytes).unwrap();
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].kind(), WindowKind::PointCloud);
        assert_eq!(outcome.candidates[0].source_index, 2);
        assert_eq!(outcome.failed_count(), 2);
    }

    #[test]
    fn test_analyze_ignores_unknown_kind_names() {
        let bytes = document_with_windows(json!([window_json(1, "chart")]));
        let summary = analyze(&bytes).unwrap();
        assert!(!summary.is_foreign());
        assert!(summary.is_restorable());
        assert_eq!(summary.kinds, BTreeSet::from([WindowKind::Chart]));
        assert_eq!(summary.total_cells, 0);
    }

    #[test]
    fn test_parse_drops_id_above_max() {
        let bytes = document_with_windows(json!([
            window_json(u64::MAX, "chart"),
            window_json(2, "chart"),
        ]));

        let outcome = parse(&bytes).unwrap();
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].id(), WindowId(2));
        assert_eq!(outcome.failures[0].id, Some(WindowId(u64::MAX)));
        assert!(outcome.failures[0].reason.contains("out of range"));
    }

    #[test]
    fn test_inspect_matches_analyze_and_parse() {
        let bytes = document_with_windows(json!([window_json(1, "chart"), window_json(2, "chart")]));
        let (summary, outcome) = inspect(&bytes).unwrap();
        assert_eq!(summary, analyze(&bytes).unwrap());
        assert_eq!(outcome, parse(&bytes).unwrap());
        assert!(summary.has_extension_data());
        assert_eq!(summary.code_cells + summary.markdown_cells + summary.raw_cells, 0);
    }

    #[test]
    fn test_unreadable_extension_is_malformed() {
        let bytes = serde_json::to_vec(&json!({
            "cells": [],
            "metadata": {"workspace_export": {"format_version": 1}},
            "nbformat": 4,
            "nbformat_minor": 5
        }))
        .unwrap();
        assert!(matches!(analyze(&bytes), Err(DocumentError::Malformed { .. })));
    }
}
