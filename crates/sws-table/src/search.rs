//! Single-flight substring search over table rows.
//!
//! Each [`TableSearch::begin`] bumps a generation counter and aborts the scan
//! before it. A scan that loses the race may still deliver results; they are
//! refused by [`TableSearch::apply`] because their generation is stale.

use tokio::task::{AbortHandle, JoinHandle};

use crate::cache::Rows;
use crate::error::{Result, TableError};

/// Rows scanned between cooperative yields unless configured otherwise.
pub const DEFAULT_YIELD_EVERY: usize = 1000;

/// Matches produced by one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub generation: u64,
    pub query: String,
    /// Raw row indices, ascending.
    pub matches: Vec<usize>,
}

/// A scan in progress.
#[derive(Debug)]
pub struct PendingSearch {
    generation: u64,
    handle: JoinHandle<SearchResults>,
}

impl PendingSearch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the scan. `None` means it was superseded and aborted.
    pub async fn wait(self) -> Result<Option<SearchResults>> {
        match self.handle.await {
            Ok(results) => Ok(Some(results)),
            Err(e) if e.is_cancelled() => {
                tracing::debug!(generation = self.generation, "search superseded");
                Ok(None)
            }
            Err(e) => Err(TableError::WorkerFailed(e.to_string())),
        }
    }
}

/// Search state for one table.
#[derive(Debug)]
pub struct TableSearch {
    yield_every: usize,
    generation: u64,
    query: String,
    matches: Option<Vec<usize>>,
    in_flight: Option<AbortHandle>,
}

impl Default for TableSearch {
    fn default() -> Self {
        Self::new(DEFAULT_YIELD_EVERY)
    }
}

impl TableSearch {
    pub fn new(yield_every: usize) -> Self {
        Self {
            yield_every: yield_every.max(1),
            generation: 0,
            query: String::new(),
            matches: None,
            in_flight: None,
        }
    }

    /// Start scanning `rows` for `query`, cancelling any previous scan.
    ///
    /// An empty query clears the search and returns `None`. Must be called
    /// from within a tokio runtime.
    pub fn begin(&mut self, query: &str, rows: Rows) -> Option<PendingSearch> {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        self.generation += 1;
        self.query = query.trim().to_string();
        self.matches = None;

        if self.query.is_empty() {
            return None;
        }

        let generation = self.generation;
        let needle = self.query.to_lowercase();
        let query = self.query.clone();
        let yield_every = self.yield_every;
        let handle = tokio::spawn(async move {
            let mut matches = Vec::new();
            for (index, row) in rows.iter().enumerate() {
                if index > 0 && index % yield_every == 0 {
                    tokio::task::yield_now().await;
                }
                if row.iter().any(|cell| cell.to_lowercase().contains(&needle)) {
                    matches.push(index);
                }
            }
            SearchResults {
                generation,
                query,
                matches,
            }
        });
        self.in_flight = Some(handle.abort_handle());
        tracing::debug!(generation, query = %self.query, "search started");
        Some(PendingSearch { generation, handle })
    }

    /// Adopt finished results if they belong to the latest scan.
    pub fn apply(&mut self, results: SearchResults) -> bool {
        if results.generation != self.generation {
            tracing::debug!(
                stale = results.generation,
                current = self.generation,
                "discarding stale search results"
            );
            return false;
        }
        tracing::debug!(matches = results.matches.len(), "search finished");
        self.in_flight = None;
        self.matches = Some(results.matches);
        true
    }

    /// Cancel any scan and drop the query.
    pub fn clear(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        self.generation += 1;
        self.query.clear();
        self.matches = None;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether display rows are addressed through the match list.
    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.is_active() && self.matches.is_none()
    }

    /// Matches of the current query, once its scan finished.
    pub fn matches(&self) -> Option<&[usize]> {
        self.matches.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn rows() -> Rows {
        Arc::new(vec![
            vec!["Alpha".into(), "north".into()],
            vec!["beta".into(), "South".into()],
            vec!["gamma".into(), "NORTHWEST".into()],
        ])
    }

    #[tokio::test]
    async fn test_case_insensitive_any_cell() {
        let mut search = TableSearch::new(1);
        let pending = search.begin("North", rows()).unwrap();
        let results = pending.wait().await.unwrap().unwrap();
        assert_eq!(results.matches, vec![0, 2]);
        assert!(search.apply(results));
        assert_eq!(search.matches(), Some(&[0, 2][..]));
        assert!(!search.is_pending());
    }

    #[tokio::test]
    async fn test_new_query_supersedes_previous() {
        let mut search = TableSearch::new(1);
        let first = search.begin("a", rows()).unwrap();
        let second = search.begin("beta", rows()).unwrap();

        if let Some(stale) = first.wait().await.unwrap() {
            assert!(!search.apply(stale));
        }
        let fresh = second.wait().await.unwrap().unwrap();
        assert!(search.apply(fresh));
        assert_eq!(search.matches(), Some(&[1][..]));
    }

    #[tokio::test]
    async fn test_empty_query_clears() {
        let mut search = TableSearch::default();
        let pending = search.begin("gamma", rows()).unwrap();
        assert!(search.is_pending());

        assert!(search.begin("   ", rows()).is_none());
        assert!(!search.is_active());
        assert!(search.matches().is_none());
        if let Some(stale) = pending.wait().await.unwrap() {
            assert!(!search.apply(stale));
        }
    }
}
