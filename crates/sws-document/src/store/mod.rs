//! Document storage.
//!
//! The codec never touches a filesystem directly. Storage is a narrow
//! collaborator that lists candidate documents and moves bytes:
//!
//! - [`FsDocumentStore`] - a directory of `.ipynb` files with atomic writes
//! - [`MemoryDocumentStore`] - an in-process store for tests and previews
//!
//! The async helpers run store calls on the blocking pool.

mod fs;
mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{DocumentError, Result};

pub use fs::FsDocumentStore;
pub use memory::MemoryDocumentStore;

/// Listing entry for a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub name: String,
    pub size: u64,
    /// Not every platform reports creation time.
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

/// Byte-level storage for workspace documents.
pub trait DocumentStore: Send + Sync {
    /// Candidate documents, most recently modified first.
    fn list_documents(&self) -> Result<Vec<StoredDocument>>;

    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Store `bytes` under `name`, replacing any previous document.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<StoredDocument>;
}

/// Reject names that could escape the store's namespace.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.contains(['/', '\\'])
        || name == "."
        || name == ".."
        || name.contains('\0');
    if invalid {
        return Err(DocumentError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn sort_newest_first(documents: &mut [StoredDocument]) {
    documents.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
}

/// List documents without blocking the async runtime.
pub async fn list_documents_async<S>(store: Arc<S>) -> Result<Vec<StoredDocument>>
where
    S: DocumentStore + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || store.list_documents())
        .await
        .map_err(|e| DocumentError::Worker(e.to_string()))?
}

/// Read a document without blocking the async runtime.
pub async fn read_document_async<S>(store: Arc<S>, name: String) -> Result<Vec<u8>>
where
    S: DocumentStore + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || store.read(&name))
        .await
        .map_err(|e| DocumentError::Worker(e.to_string()))?
}

/// Write a document without blocking the async runtime.
pub async fn write_document_async<S>(
    store: Arc<S>,
    name: String,
    bytes: Vec<u8>,
) -> Result<StoredDocument>
where
    S: DocumentStore + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || store.write(&name, &bytes))
        .await
        .map_err(|e| DocumentError::Worker(e.to_string()))?
}
