//! Directory-backed document store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::{DocumentStore, StoredDocument, sort_newest_first, validate_name};
use crate::error::{DocumentError, Result};

/// Extension of workspace documents.
pub const DOCUMENT_EXTENSION: &str = "ipynb";

/// Stores documents as `.ipynb` files in one directory.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| DocumentError::Io {
            operation: "create directory",
            path: root.clone(),
            source: e,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a document, appending the extension when missing.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        let mut path = self.root.join(name);
        if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
            let mut file_name = path.file_name().unwrap_or_default().to_os_string();
            file_name.push(".");
            file_name.push(DOCUMENT_EXTENSION);
            path.set_file_name(file_name);
        }
        Ok(path)
    }

    fn describe(path: &Path) -> Result<StoredDocument> {
        let meta = fs::metadata(path).map_err(|e| DocumentError::Io {
            operation: "inspect",
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(StoredDocument {
            name: path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string(),
            size: meta.len(),
            created: meta.created().ok().map(DateTime::<Utc>::from),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}

impl DocumentStore for FsDocumentStore {
    fn list_documents(&self) -> Result<Vec<StoredDocument>> {
        let entries = fs::read_dir(&self.root).map_err(|e| DocumentError::Io {
            operation: "list",
            path: self.root.clone(),
            source: e,
        })?;

        let mut documents = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DocumentError::Io {
                operation: "list",
                path: self.root.clone(),
                source: e,
            })?;
            let path = entry.path();
            let is_document = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(DOCUMENT_EXTENSION);
            if !is_document {
                continue;
            }
            match Self::describe(&path) {
                Ok(document) => documents.push(document),
                // A file vanishing between read_dir and stat is not fatal to the listing.
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping entry"),
            }
        }

        sort_newest_first(&mut documents);
        Ok(documents)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(DocumentError::NotFound {
                name: name.to_string(),
            });
        }
        let bytes = fs::read(&path).map_err(|e| DocumentError::Io {
            operation: "read",
            path: path.clone(),
            source: e,
        })?;
        tracing::info!("Read workspace document {}", path.display());
        Ok(bytes)
    }

    /// Write through a temp file and rename so a crash never leaves a torn document.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<StoredDocument> {
        let path = self.path_for(name)?;
        let temp_path = path.with_extension(format!("{DOCUMENT_EXTENSION}.tmp"));

        let mut file = File::create(&temp_path).map_err(|e| DocumentError::Io {
            operation: "create",
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(bytes).map_err(|e| DocumentError::Io {
            operation: "write",
            path: temp_path.clone(),
            source: e,
        })?;

        file.sync_all().map_err(|e| DocumentError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, &path).map_err(|e| DocumentError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.clone(),
            source: e,
        })?;

        tracing::info!("Saved workspace document to {}", path.display());
        Self::describe(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path()).unwrap();

        let stored = store.write("layout", b"{}").unwrap();
        assert_eq!(stored.name, "layout.ipynb");
        assert_eq!(stored.size, 2);
        assert_eq!(store.read("layout.ipynb").unwrap(), b"{}");
        assert!(!dir.path().join("layout.ipynb.tmp").exists());
    }

    #[test]
    fn test_list_filters_extension() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path()).unwrap();
        store.write("a.ipynb", b"{}").unwrap();
        store.write("b.ipynb", b"{}").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        fs::create_dir(dir.path().join("nested.ipynb")).unwrap();

        let names: Vec<String> = store
            .list_documents()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.ipynb".to_string()));
        assert!(names.contains(&"b.ipynb".to_string()));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.read("missing"),
            Err(DocumentError::NotFound { .. })
        ));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path().join("docs")).unwrap();
        assert!(matches!(
            store.write("../escape.ipynb", b"{}"),
            Err(DocumentError::InvalidName { .. })
        ));
    }
}
