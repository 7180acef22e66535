//! Storage traits and error types
//!
//! This module defines the trait interface the crawler uses to read its
//! batch and record results.

use crate::crawler::RunSummary;
use crate::extract::{ArticlePage, VisualContent};
use crate::storage::{CrawlTarget, RawPageRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Crawl target not found: {0}")]
    TargetNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Write operations that the crawler treats as best-effort (`insert_page`,
/// `insert_page_raw`, `insert_visual_link`) report success as a `bool`
/// instead of an error; implementations log the underlying failure.
pub trait Storage {
    // ===== Source & Batch =====

    /// Resolves the source id for a site profile code
    fn get_source_id(&self, code: &str) -> StorageResult<i64>;

    /// Loads the pending crawl targets for a source, in processing order
    fn get_crawl_list(&self, source_id: i64) -> StorageResult<Vec<CrawlTarget>>;

    // ===== Results =====

    /// Stores a compacted raw page snapshot
    fn insert_page_raw(&mut self, record: &RawPageRecord) -> bool;

    /// Stores an extracted article, replacing any earlier row for the same `url_md5`
    fn insert_page(&mut self, page: &ArticlePage) -> bool;

    /// Stores one visual content reference
    fn insert_visual_link(&mut self, visual: &VisualContent) -> bool;

    // ===== Counters =====

    /// Increments the crawl counter of the target identified by `url_md5`
    fn update_list_crawlercount(&mut self, url_md5: &str) -> StorageResult<()>;

    /// Increments the error counter of the target identified by `url_md5`
    fn update_list_errorcount(&mut self, url_md5: &str) -> StorageResult<()>;

    // ===== Run Telemetry =====

    /// Records the start of a crawl run and returns its id
    fn start_run(&mut self, source_id: i64, options: &str) -> StorageResult<i64>;

    /// Records the outcome of a crawl run
    fn finish_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()>;
}
