//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Crawl list and per-target counters
//! - Article, raw page and visual link persistence
//! - Run telemetry

mod minify;
mod schema;
mod sqlite;
mod traits;

pub use minify::HtmlMinifier;
pub use sqlite::{url_md5, CrawlListPolicy, SqliteStorage};
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(PresswireError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> crate::Result<SqliteStorage> {
    SqliteStorage::new(path)
}

/// One article URL queued for crawling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub id: i64,
    pub url: String,
    /// Idempotency key for counters and linked records
    pub url_md5: String,
    pub crawl_count: u32,
    pub error_count: u32,
}

/// Compacted raw HTML of a fetched page
#[derive(Debug, Clone)]
pub struct RawPageRecord {
    pub list_id: i64,
    pub url: String,
    pub url_md5: String,
    pub page_content: String,
}

impl RawPageRecord {
    pub fn from_html(target: &CrawlTarget, html: &str, minifier: &HtmlMinifier) -> Self {
        Self {
            list_id: target.id,
            url: target.url.clone(),
            url_md5: target.url_md5.clone(),
            page_content: minifier.minify(html),
        }
    }
}

/// An article row as persisted in the `pages` table
#[derive(Debug, Clone)]
pub struct StoredPage {
    pub list_id: i64,
    pub source_id: i64,
    pub url: String,
    pub redirected_url: String,
    pub title: String,
    pub body: String,
    pub publish_time: String,
    pub authors: Vec<String>,
    pub keywords: Vec<String>,
    pub image_count: u32,
    pub video_count: u32,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub source_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub options: String,
    pub attempted: Option<u64>,
    pub succeeded: Option<u64>,
}
