//! In-memory document store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::{DocumentStore, StoredDocument, sort_newest_first, validate_name};
use crate::error::{DocumentError, Result};

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl Entry {
    fn describe(&self, name: &str) -> StoredDocument {
        StoredDocument {
            name: name.to_string(),
            size: self.bytes.len() as u64,
            created: Some(self.created),
            modified: Some(self.modified),
        }
    }
}

/// Process-local store; documents vanish with it.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    entries: Mutex<BTreeMap<String, Entry>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries are plain data, so a poisoned lock still guards a usable map.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn list_documents(&self) -> Result<Vec<StoredDocument>> {
        let mut documents: Vec<_> = self
            .lock()
            .iter()
            .map(|(name, entry)| entry.describe(name))
            .collect();
        sort_newest_first(&mut documents);
        Ok(documents)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        validate_name(name)?;
        self.lock()
            .get(name)
            .map(|entry| entry.bytes.clone())
            .ok_or_else(|| DocumentError::NotFound {
                name: name.to_string(),
            })
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<StoredDocument> {
        validate_name(name)?;
        let now = Utc::now();
        let mut entries = self.lock();
        let entry = entries
            .entry(name.to_string())
            .and_modify(|entry| {
                entry.bytes = bytes.to_vec();
                entry.modified = now;
            })
            .or_insert_with(|| Entry {
                bytes: bytes.to_vec(),
                created: now,
                modified: now,
            });
        Ok(entry.describe(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_created() {
        let store = MemoryDocumentStore::new();
        let first = store.write("a", b"1").unwrap();
        let second = store.write("a", b"22").unwrap();
        assert_eq!(first.created, second.created);
        assert_eq!(second.size, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.read("a").unwrap(), b"22");
    }

    #[test]
    fn test_missing_document() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(store.read("nope"), Err(DocumentError::NotFound { .. })));
    }
}
