//! Workspace session: export to and import from a document store.
//!
//! The session owns the collaborators of one workspace (store, exporter,
//! restoration engine). The live [`Registry`] stays with the caller and is
//! only borrowed for the duration of an import.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use sws_document::store::{list_documents_async, read_document_async, write_document_async};
use sws_document::{
    DocumentExporter, DocumentStore, DocumentSummary, ExportOptions, FsDocumentStore,
    RecordFailure, SpatialTarget, SpatialUpdate, StoredDocument, analyze_async, inspect_async,
    suggested_file_name, update_stored_spatial_async,
};
use sws_model::{Registry, RegistrySnapshot, WindowPayload, WindowPosition, WindowRecord};
use sws_restore::{
    ActivationHook, RestorationEngine, RestorationResult, RestoreOptions, RestorePhase,
    RestoreProgress,
};
use sws_table::{CacheConfig, TableViewer};

use crate::error::{Result, WorkspaceError};
use crate::logging::redact_content;
use crate::settings::Settings;

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub document: StoredDocument,
    pub window_count: usize,
    pub byte_count: usize,
}

/// What an import found and did.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub summary: DocumentSummary,
    /// Structured entries that could not be rebuilt.
    pub parse_failures: Vec<RecordFailure>,
    /// `None` for foreign documents, which are never restored.
    pub restoration: Option<RestorationResult>,
}

impl ImportReport {
    pub fn is_foreign(&self) -> bool {
        self.summary.is_foreign()
    }

    /// Every structured entry parsed and every window opened.
    pub fn is_fully_successful(&self) -> bool {
        self.parse_failures.is_empty()
            && self
                .restoration
                .as_ref()
                .is_some_and(RestorationResult::is_fully_successful)
    }
}

/// One workspace's persistence collaborators.
#[derive(Debug)]
pub struct WorkspaceSession<S: ?Sized, H> {
    store: Arc<S>,
    exporter: DocumentExporter,
    engine: RestorationEngine<H>,
    table_config: CacheConfig,
    search_yield_every: usize,
}

impl<H: ActivationHook> WorkspaceSession<FsDocumentStore, H> {
    /// Session over the configured documents directory.
    pub fn from_settings(settings: &Settings, hook: H) -> Result<Self> {
        let store = FsDocumentStore::new(settings.documents_dir())?;
        tracing::info!(root = %store.root().display(), "workspace session opened");
        Ok(Self::new(Arc::new(store), DocumentExporter::new(), RestorationEngine::new(hook))
            .with_table_settings(
                CacheConfig::from(&settings.table),
                settings.table.search_yield_every,
            ))
    }

    /// Where documents are stored.
    pub fn documents_dir(&self) -> &Path {
        self.store.root()
    }
}

impl<S, H> WorkspaceSession<S, H>
where
    S: DocumentStore + ?Sized + 'static,
    H: ActivationHook,
{
    pub fn new(store: Arc<S>, exporter: DocumentExporter, engine: RestorationEngine<H>) -> Self {
        Self {
            store,
            exporter,
            engine,
            table_config: CacheConfig::default(),
            search_yield_every: sws_table::DEFAULT_YIELD_EVERY,
        }
    }

    #[must_use]
    pub fn with_table_settings(mut self, config: CacheConfig, search_yield_every: usize) -> Self {
        self.table_config = config;
        self.search_yield_every = search_yield_every;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn engine(&self) -> &RestorationEngine<H> {
        &self.engine
    }

    /// Stored documents, most recently modified first.
    pub async fn list_documents(&self) -> Result<Vec<StoredDocument>> {
        Ok(list_documents_async(Arc::clone(&self.store)).await?)
    }

    /// Export `snapshot` and store it under `name`, or a timestamped name.
    pub async fn export_to_store(
        &self,
        snapshot: RegistrySnapshot,
        name: Option<&str>,
        options: ExportOptions,
    ) -> Result<ExportReport> {
        let name = name.map_or_else(|| suggested_file_name(Utc::now()), str::to_string);
        let window_count = snapshot.len();

        let bytes = self.exporter.export_async(snapshot, options).await?;
        let byte_count = bytes.len();
        let document = write_document_async(Arc::clone(&self.store), name, bytes).await?;

        tracing::info!(
            document = %document.name,
            windows = window_count,
            bytes = byte_count,
            "workspace saved"
        );
        Ok(ExportReport {
            document,
            window_count,
            byte_count,
        })
    }

    /// Summarize a stored document without restoring anything.
    pub async fn preview(&self, name: &str) -> Result<DocumentSummary> {
        let bytes = read_document_async(Arc::clone(&self.store), name.to_string()).await?;
        Ok(analyze_async(bytes).await?)
    }

    /// Read, parse and restore a stored document into `registry`.
    ///
    /// Foreign documents are summarized but leave the registry untouched,
    /// even with `clear_existing` set.
    pub async fn import<F>(
        &self,
        name: &str,
        registry: &mut Registry,
        options: &RestoreOptions,
        mut on_progress: F,
    ) -> Result<ImportReport>
    where
        F: FnMut(&RestoreProgress),
    {
        on_progress(&RestoreProgress::new(
            RestorePhase::Idle,
            0.0,
            format!("Reading {name}…"),
        ));
        let bytes = read_document_async(Arc::clone(&self.store), name.to_string()).await?;

        on_progress(&RestoreProgress::new(
            RestorePhase::Idle,
            0.02,
            "Parsing document…",
        ));
        let (summary, outcome) = inspect_async(bytes).await?;
        if outcome.is_foreign() {
            tracing::info!(document = name, "foreign document, nothing restored");
            return Ok(ImportReport {
                summary,
                parse_failures: Vec::new(),
                restoration: None,
            });
        }

        let restoration = self
            .engine
            .restore(outcome.candidates, registry, options, on_progress)
            .await;

        for window in &restoration.opened_windows {
            if let Some(record) = registry.get(window.id) {
                tracing::trace!(id = %window.id, content = redact_content(&record.content), "window content restored");
            }
        }
        tracing::info!(
            document = name,
            opened = restoration.opened_windows.len(),
            failed = restoration.failed_windows.len(),
            dropped = outcome.failures.len(),
            "workspace imported"
        );

        Ok(ImportReport {
            summary,
            parse_failures: outcome.failures,
            restoration: Some(restoration),
        })
    }

    /// Move the targeted cells of a stored document to `position`.
    pub async fn update_layout(
        &self,
        name: &str,
        target: SpatialTarget,
        position: WindowPosition,
    ) -> Result<SpatialUpdate> {
        let update =
            update_stored_spatial_async(Arc::clone(&self.store), name.to_string(), target, position)
                .await?;
        tracing::info!(
            document = name,
            cells = update.updated_cells,
            windows = update.updated_windows,
            "layout saved"
        );
        Ok(update)
    }

    /// Build a loaded table viewer for a table window.
    pub async fn table_viewer(&self, record: &WindowRecord) -> Result<TableViewer> {
        let Some(WindowPayload::TabularFrame(frame)) = &record.payload else {
            return Err(WorkspaceError::NotATable(record.id));
        };
        let mut viewer = TableViewer::new(self.table_config, self.search_yield_every);
        viewer.load(frame.clone()).await?;
        Ok(viewer)
    }
}
