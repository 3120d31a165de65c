//! Workspace document codec and storage.
//!
//! Workspaces are persisted as Jupyter notebooks so any notebook tool can open
//! them. The human-readable part is a list of cells; the restorable part is a
//! versioned extension block in the notebook metadata.
//!
//! # Document Layout
//!
//! ```text
//! cells:
//!   [0] markdown  workspace summary (window counts by kind)
//!   [1] markdown  debug block            (only with include_debug_info)
//!   [n] code      one cell per window    (header, metrics preamble, content)
//! metadata:
//!   kernelspec / language_info           (for generic notebook tools)
//!   workspace_export:
//!     format_version, export_date, total_windows,
//!     windows[]       structured records (authoritative on import)
//!     window_types[], tags[], fingerprint, debug?
//! ```
//!
//! # Import
//!
//! - [`analyze`] is a cheap pre-flight that never builds window records.
//! - [`parse`] rebuilds [`CandidateRecord`]s, dropping broken entries
//!   individually.
//! - [`inspect`] yields both from one decode.
//!
//! # Layout Edits
//!
//! [`update_spatial_metadata`] rewrites the `spatial` metadata of one cell or
//! of every cell; window cells carry the new placement into the structured
//! list as well.
//! - A valid notebook without the extension is a *foreign* document: an
//!   empty, successful result rather than an error.
//!
//! # Example
//!
//! ```ignore
//! use sws_document::{DocumentExporter, ExportOptions, parse};
//!
//! let bytes = DocumentExporter::new().export(&registry.snapshot(), &ExportOptions::default())?;
//! let outcome = parse(&bytes)?;
//! assert_eq!(outcome.candidates.len(), registry.len());
//! ```

#![deny(unsafe_code)]

mod error;
mod export;
mod import;
mod metadata;
mod notebook;
mod spatial;
pub mod store;

pub use error::{DocumentError, Result};
pub use export::{DocumentExporter, ExportOptions, suggested_file_name};
pub use import::{
    CandidateRecord, DocumentSummary, ExportInfo, ParseOutcome, RecordFailure, analyze,
    analyze_async, inspect, inspect_async, parse, parse_async,
};
pub use metadata::{DebugInfo, ExportMetadata, FORMAT_VERSION, fingerprint};
pub use notebook::{Cell, CodeCell, EXTENSION_KEY, Notebook, NotebookMetadata, TextCell};
pub use spatial::{
    SpatialTarget, SpatialUpdate, spatial_value, update_spatial_metadata, update_stored_spatial,
    update_stored_spatial_async,
};
pub use store::{DocumentStore, FsDocumentStore, MemoryDocumentStore, StoredDocument};
