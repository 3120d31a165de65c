//! Bounded chunk cache over a large row collection.
//!
//! The full row collection stays behind an `Arc`; only a few chunks of it are
//! materialized for rendering at any time. Chunks are cut on a blocking
//! worker and the least recently loaded one is evicted once the bound is
//! exceeded.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use sws_model::TableFrame;

use crate::config::CacheConfig;
use crate::error::{Result, TableError};
use crate::sort::sort_rows;

/// Shared, immutable row storage.
pub type Rows = Arc<Vec<Vec<String>>>;

#[derive(Debug)]
struct Chunk {
    rows: Vec<Vec<String>>,
    /// Monotonic load order; ties on `loaded_at` are impossible with it.
    sequence: u64,
    loaded_at: Instant,
}

/// Presents a large table through a small window of cached chunks.
#[derive(Debug)]
pub struct ChunkedTableCache {
    config: CacheConfig,
    columns: Vec<String>,
    rows: Rows,
    chunks: BTreeMap<usize, Chunk>,
    next_sequence: u64,
}

impl ChunkedTableCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config: config.normalized(),
            columns: Vec::new(),
            rows: Arc::new(Vec::new()),
            chunks: BTreeMap::new(),
            next_sequence: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Replace the dataset and load chunk 0.
    pub async fn load_initial_data(&mut self, frame: TableFrame) -> Result<()> {
        self.columns = frame.columns;
        self.rows = Arc::new(frame.rows);
        self.chunks.clear();
        tracing::info!(
            rows = self.rows.len(),
            columns = self.columns.len(),
            "table data loaded"
        );
        self.load_chunks_for_range(0..1).await?;
        Ok(())
    }

    /// Make sure the chunks covering `visible` are cached.
    ///
    /// At most `max_cached_chunks` chunks are considered, starting at the
    /// top of the range. Returns the indices that had to be loaded.
    pub async fn load_chunks_for_range(&mut self, visible: Range<usize>) -> Result<Vec<usize>> {
        let wanted = self.covering_chunks(&visible);
        self.load_chunks(&wanted).await
    }

    /// Make sure exactly these chunks are cached, up to `max_cached_chunks`
    /// of them in the given order. Out-of-range indices are ignored.
    ///
    /// Every chunk kept from `indices` is protected from the eviction that
    /// follows. Returns the indices that had to be loaded.
    pub async fn load_chunks(&mut self, indices: &[usize]) -> Result<Vec<usize>> {
        let chunk_count = self.rows.len().div_ceil(self.config.chunk_size);
        let mut seen = BTreeSet::new();
        let wanted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&index| index < chunk_count && seen.insert(index))
            .take(self.config.max_cached_chunks)
            .collect();
        let missing: Vec<usize> = wanted
            .iter()
            .copied()
            .filter(|index| !self.chunks.contains_key(index))
            .collect();
        if missing.is_empty() {
            return Ok(missing);
        }

        let delay = self.config.load_delay(self.rows.len());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let rows = Arc::clone(&self.rows);
        let chunk_size = self.config.chunk_size;
        let to_load = missing.clone();
        let materialized = tokio::task::spawn_blocking(move || {
            to_load
                .into_iter()
                .map(|index| {
                    let start = index * chunk_size;
                    let end = (start + chunk_size).min(rows.len());
                    (index, rows[start..end].to_vec())
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| TableError::WorkerFailed(e.to_string()))?;

        for (index, rows) in materialized {
            tracing::debug!(chunk = index, rows = rows.len(), "chunk loaded");
            self.chunks.insert(
                index,
                Chunk {
                    rows,
                    sequence: self.next_sequence,
                    loaded_at: Instant::now(),
                },
            );
            self.next_sequence += 1;
        }

        let protected: BTreeSet<usize> = wanted.into_iter().collect();
        self.evict(&protected);
        Ok(missing)
    }

    /// Sort the whole collection by `column` and start over from chunk 0.
    pub async fn sort_data(&mut self, column: &str, ascending: bool) -> Result<()> {
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| TableError::UnknownColumn {
                name: column.to_string(),
            })?;

        // The current rows stay installed until the sorted copy is ready, so
        // a dropped or failed sort leaves the table as it was.
        let rows = Arc::clone(&self.rows);
        let (sorted, numeric) = tokio::task::spawn_blocking(move || {
            let mut rows = (*rows).clone();
            let numeric = sort_rows(&mut rows, index, ascending);
            (rows, numeric)
        })
        .await
        .map_err(|e| TableError::WorkerFailed(e.to_string()))?;
        self.rows = Arc::new(sorted);
        self.chunks.clear();

        tracing::info!(column, ascending, numeric, "table sorted");
        self.load_chunks_for_range(0..1).await?;
        Ok(())
    }

    /// Chunk indices covering `range`, clamped to the cache bound.
    fn covering_chunks(&self, range: &Range<usize>) -> Vec<usize> {
        let total = self.rows.len();
        if total == 0 {
            return Vec::new();
        }
        let start = range.start.min(total - 1);
        let end = range.end.clamp(start + 1, total);
        let first = start / self.config.chunk_size;
        let last = (end - 1) / self.config.chunk_size;
        (first..=last).take(self.config.max_cached_chunks).collect()
    }

    fn evict(&mut self, protected: &BTreeSet<usize>) {
        while self.chunks.len() > self.config.max_cached_chunks {
            let oldest = self
                .chunks
                .iter()
                .filter(|(index, _)| !protected.contains(index))
                .min_by_key(|(_, chunk)| chunk.sequence)
                .map(|(index, _)| *index);
            let Some(index) = oldest else {
                break;
            };
            if let Some(chunk) = self.chunks.remove(&index) {
                tracing::debug!(
                    chunk = index,
                    age_ms = chunk.loaded_at.elapsed().as_millis() as u64,
                    "chunk evicted"
                );
            }
        }
    }

    /// A cached row, or `None` when its chunk isn't loaded.
    pub fn row(&self, index: usize) -> Option<&[String]> {
        let chunk = self.chunks.get(&self.chunk_for_row(index))?;
        chunk
            .rows
            .get(index % self.config.chunk_size)
            .map(Vec::as_slice)
    }

    pub fn chunk_for_row(&self, index: usize) -> usize {
        index / self.config.chunk_size
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The full backing collection, for scans that need every row.
    pub fn shared_rows(&self) -> Rows {
        Arc::clone(&self.rows)
    }

    pub fn cached_chunk_indices(&self) -> Vec<usize> {
        self.chunks.keys().copied().collect()
    }

    pub fn cached_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The chunk loaded last.
    pub fn most_recent_chunk(&self) -> Option<usize> {
        self.chunks
            .iter()
            .max_by_key(|(_, chunk)| chunk.sequence)
            .map(|(index, _)| *index)
    }
}
