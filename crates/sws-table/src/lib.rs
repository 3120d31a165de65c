//! Table window support.
//!
//! - [`ChunkedTableCache`] keeps a bounded set of row chunks materialized
//! - [`TableSearch`] runs a cancellable substring scan
//! - [`TableViewer`] combines both for display addressing
//! - [`read_csv_frame`] / [`read_csv_file`] build frames from CSV

#![deny(unsafe_code)]

mod cache;
mod config;
mod error;
mod ingest;
mod search;
mod sort;
mod viewer;

pub use cache::{ChunkedTableCache, Rows};
pub use config::CacheConfig;
pub use error::{Result, TableError};
pub use ingest::{read_csv_file, read_csv_frame};
pub use search::{DEFAULT_YIELD_EVERY, PendingSearch, SearchResults, TableSearch};
pub use sort::sort_rows;
pub use viewer::TableViewer;
