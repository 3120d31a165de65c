//! Display-side state of a table window.

use std::ops::Range;

use sws_model::TableFrame;

use crate::cache::ChunkedTableCache;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::search::TableSearch;

/// Couples the chunk cache with search so display rows resolve through the
/// match list while a query is active.
#[derive(Debug)]
pub struct TableViewer {
    cache: ChunkedTableCache,
    search: TableSearch,
}

impl TableViewer {
    pub fn new(config: CacheConfig, search_yield_every: usize) -> Self {
        Self {
            cache: ChunkedTableCache::new(config),
            search: TableSearch::new(search_yield_every),
        }
    }

    pub async fn load(&mut self, frame: TableFrame) -> Result<()> {
        self.search.clear();
        self.cache.load_initial_data(frame).await
    }

    pub fn cache(&self) -> &ChunkedTableCache {
        &self.cache
    }

    pub fn search(&self) -> &TableSearch {
        &self.search
    }

    /// Rows currently addressable for display.
    pub fn display_row_count(&self) -> usize {
        if self.search.is_active() {
            self.search.matches().map_or(0, <[usize]>::len)
        } else {
            self.cache.total_rows()
        }
    }

    /// Raw row index behind a display index.
    pub fn resolve_row(&self, display_index: usize) -> Option<usize> {
        if self.search.is_active() {
            self.search.matches()?.get(display_index).copied()
        } else {
            (display_index < self.cache.total_rows()).then_some(display_index)
        }
    }

    /// The row shown at `display_index`, if its chunk is cached.
    pub fn row_for_display(&self, display_index: usize) -> Option<&[String]> {
        self.cache.row(self.resolve_row(display_index)?)
    }

    /// Load the chunks backing a range of display rows.
    ///
    /// Under a query the visible rows can sit far apart, so only the chunks
    /// that actually hold them are loaded, in display order.
    pub async fn load_visible(&mut self, display: Range<usize>) -> Result<Vec<usize>> {
        let chunks: Vec<usize> = display
            .filter_map(|i| self.resolve_row(i))
            .map(|row| self.cache.chunk_for_row(row))
            .collect();
        self.cache.load_chunks(&chunks).await
    }

    /// Run `query` to completion, superseding any earlier one.
    pub async fn set_query(&mut self, query: &str) -> Result<()> {
        let Some(pending) = self.search.begin(query, self.cache.shared_rows()) else {
            return Ok(());
        };
        if let Some(results) = pending.wait().await? {
            self.search.apply(results);
        }
        Ok(())
    }

    /// Sort the table and refresh an active query against the new order.
    pub async fn sort(&mut self, column: &str, ascending: bool) -> Result<()> {
        self.cache.sort_data(column, ascending).await?;
        if self.search.is_active() {
            let query = self.search.query().to_string();
            self.set_query(&query).await?;
        }
        Ok(())
    }
}

impl Default for TableViewer {
    fn default() -> Self {
        Self::new(CacheConfig::default(), crate::search::DEFAULT_YIELD_EVERY)
    }
}
