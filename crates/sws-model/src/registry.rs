//! Live window registry.
//!
//! The registry is owned by the window manager. The persistence core never
//! keeps a handle to it: exports read a [`RegistrySnapshot`], restorations
//! borrow it mutably for the duration of a single call.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::error::{ModelError, Result};
use crate::kind::WindowKind;
use crate::record::{WindowId, WindowRecord};

/// Live set of windows keyed by id, iterated in ascending id order.
#[derive(Debug, Clone)]
pub struct Registry {
    windows: BTreeMap<WindowId, WindowRecord>,
    /// Next id the generator will try; always above every id ever inserted.
    next_id: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry whose first generated id is 1.
    pub fn new() -> Self {
        Self {
            windows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a placeholder window of `kind` under a freshly generated id.
    pub fn create_window(&mut self, kind: WindowKind) -> WindowId {
        let id = self.allocate_id();
        self.windows.insert(id, WindowRecord::new(id, kind));
        tracing::debug!(%id, %kind, "window created");
        id
    }

    /// Register a record under its own id.
    pub fn insert(&mut self, record: WindowRecord) -> Result<WindowId> {
        if self.windows.contains_key(&record.id) {
            return Err(ModelError::DuplicateId(record.id));
        }
        record.validate()?;
        let id = record.id;
        self.reserve(id);
        self.windows.insert(id, record);
        Ok(id)
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.get(&id)
    }

    /// Mutable access. Record methods keep `last_modified` current.
    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.windows.get_mut(&id)
    }

    /// Apply `f` to a registered window.
    pub fn update<T>(&mut self, id: WindowId, f: impl FnOnce(&mut WindowRecord) -> T) -> Result<T> {
        self.windows
            .get_mut(&id)
            .map(f)
            .ok_or(ModelError::UnknownWindow(id))
    }

    pub fn remove(&mut self, id: WindowId) -> Option<WindowRecord> {
        self.windows.remove(&id)
    }

    /// Remove every window in one step. The id generator keeps counting.
    pub fn clear(&mut self) -> usize {
        let removed = self.windows.len();
        self.windows.clear();
        removed
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.windows.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowRecord> {
        self.windows.values()
    }

    /// Hand out the next unused id.
    pub fn allocate_id(&mut self) -> WindowId {
        self.allocate_id_avoiding(&BTreeSet::new())
    }

    /// Hand out the next id that is neither live nor in `avoid`.
    ///
    /// Once the generator passes `WindowId::MAX` it stays there and the
    /// lowest free id is handed out instead.
    pub fn allocate_id_avoiding(&mut self, avoid: &BTreeSet<WindowId>) -> WindowId {
        let is_free = |id: &WindowId| !self.windows.contains_key(id) && !avoid.contains(id);

        while self.next_id <= WindowId::MAX.0 {
            let candidate = WindowId(self.next_id);
            self.next_id += 1;
            if is_free(&candidate) {
                return candidate;
            }
        }

        // At most `len + avoid.len()` ids are taken, so this ends long before MAX.
        let mut candidate = 1;
        while !is_free(&WindowId(candidate)) {
            candidate += 1;
        }
        WindowId(candidate)
    }

    /// Copy the current windows out for a read-only consumer.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            windows: self.windows.values().cloned().collect(),
            taken_at: Utc::now(),
        }
    }

    pub fn stats(&self) -> WorkspaceStats {
        WorkspaceStats::collect(self.windows.values())
    }

    fn reserve(&mut self, id: WindowId) {
        if id.0 >= self.next_id {
            self.next_id = id.0.saturating_add(1);
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Owned copy of a registry's windows, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrySnapshot {
    pub windows: Vec<WindowRecord>,
    pub taken_at: DateTime<Utc>,
}

impl RegistrySnapshot {
    /// Build a snapshot from loose records (tests, foreign producers).
    pub fn from_records(windows: Vec<WindowRecord>) -> Self {
        Self {
            windows,
            taken_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn stats(&self) -> WorkspaceStats {
        WorkspaceStats::collect(&self.windows)
    }
}

// =============================================================================
// STATS
// =============================================================================

/// Aggregate counts over a set of windows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceStats {
    pub total_windows: usize,
    /// Only kinds with at least one window appear.
    pub per_kind: BTreeMap<WindowKind, usize>,
    pub tags: BTreeSet<String>,
    pub content_bytes: usize,
}

impl WorkspaceStats {
    fn collect<'a>(windows: impl IntoIterator<Item = &'a WindowRecord>) -> Self {
        let mut stats = Self::default();
        for window in windows {
            stats.total_windows += 1;
            *stats.per_kind.entry(window.kind).or_default() += 1;
            stats.tags.extend(window.tags.iter().cloned());
            stats.content_bytes += window.content.len();
        }
        stats
    }

    pub fn count(&self, kind: WindowKind) -> usize {
        self.per_kind.get(&kind).copied().unwrap_or(0)
    }
}
