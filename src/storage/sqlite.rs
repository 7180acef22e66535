//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::RunSummary;
use crate::extract::{ArticlePage, VisualContent};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{CrawlTarget, RawPageRecord, RunRecord, StoredPage};
use crate::PresswireError;
use chrono::Utc;
use md5::{Digest, Md5};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Lowercase hex MD5 of a URL, the idempotency key of a crawl target
pub fn url_md5(url: &str) -> String {
    hex::encode(Md5::digest(url.as_bytes()))
}

/// Which targets count as pending when a batch is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlListPolicy {
    /// Targets with at least this many errors are skipped
    pub max_error_count: u32,
    /// Maximum batch size; `None` loads every pending target
    pub batch_limit: Option<usize>,
}

impl Default for CrawlListPolicy {
    fn default() -> Self {
        Self {
            max_error_count: 3,
            batch_limit: None,
        }
    }
}

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    policy: CrawlListPolicy,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(PresswireError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, PresswireError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            policy: CrawlListPolicy::default(),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, PresswireError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            policy: CrawlListPolicy::default(),
        })
    }

    /// Replaces the pending-batch policy
    pub fn with_policy(mut self, policy: CrawlListPolicy) -> Self {
        self.policy = policy;
        self
    }

    // ===== Source & Target Registration =====

    /// Registers a source, returning the existing id if the code is known
    pub fn register_source(&mut self, code: &str, name: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO sources (code, name, created_at) VALUES (?1, ?2, ?3)",
            params![code, name, Utc::now().to_rfc3339()],
        )?;
        self.get_source_id(code)
    }

    /// Queues a URL for crawling
    ///
    /// # Returns
    ///
    /// * `Ok(Some(id))` - The new target's id
    /// * `Ok(None)` - A target with the same `url_md5` already exists
    pub fn add_crawl_target(&mut self, source_id: i64, url: &str) -> StorageResult<Option<i64>> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO crawl_list (source_id, url, url_md5, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![source_id, url, url_md5(url), Utc::now().to_rfc3339()],
        )?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(self.conn.last_insert_rowid()))
    }

    /// Gets a crawl target by its `url_md5`
    pub fn get_target(&self, url_md5: &str) -> StorageResult<Option<CrawlTarget>> {
        let target = self
            .conn
            .query_row(
                "SELECT id, url, url_md5, crawler_count, error_count FROM crawl_list WHERE url_md5 = ?1",
                params![url_md5],
                |row| {
                    Ok(CrawlTarget {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        url_md5: row.get(2)?,
                        crawl_count: row.get(3)?,
                        error_count: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(target)
    }

    // ===== Read-back =====

    /// Gets the stored article for a target
    pub fn get_page(&self, url_md5: &str) -> StorageResult<Option<StoredPage>> {
        let row = self
            .conn
            .query_row(
                "SELECT list_id, source_id, url, redirected_url, title, body, publish_time,
                 authors, keywords, image, video
                 FROM pages WHERE url_md5 = ?1",
                params![url_md5],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                        row.get::<_, String>(8)?,
                        row.get::<_, u32>(9)?,
                        row.get::<_, u32>(10)?,
                    ))
                },
            )
            .optional()?;

        let Some((
            list_id,
            source_id,
            url,
            redirected_url,
            title,
            body,
            publish_time,
            authors,
            keywords,
            image_count,
            video_count,
        )) = row
        else {
            return Ok(None);
        };

        Ok(Some(StoredPage {
            list_id,
            source_id,
            url,
            redirected_url,
            title,
            body,
            publish_time,
            authors: serde_json::from_str(&authors)?,
            keywords: serde_json::from_str(&keywords)?,
            image_count,
            video_count,
        }))
    }

    /// Gets the visual links stored for a target, in insertion order
    pub fn get_visual_links(&self, url_md5: &str) -> StorageResult<Vec<VisualContent>> {
        let mut stmt = self.conn.prepare(
            "SELECT list_id, url_md5, type, visual_src, caption
             FROM visual_links WHERE url_md5 = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt
            .query_map(params![url_md5], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let visuals = rows
            .into_iter()
            .filter_map(|(list_id, url_md5, code, visual_src, caption)| {
                let kind = crate::extract::VisualKind::from_db_code(code)?;
                Some(VisualContent {
                    kind,
                    visual_src,
                    caption,
                    list_id: Some(list_id),
                    url_md5: Some(url_md5),
                })
            })
            .collect();

        Ok(visuals)
    }

    /// Gets the raw snapshots stored for a target
    pub fn get_page_raw(&self, url_md5: &str) -> StorageResult<Vec<RawPageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT list_id, url, url_md5, page_content FROM page_raw WHERE url_md5 = ?1 ORDER BY id ASC",
        )?;

        let records = stmt
            .query_map(params![url_md5], |row| {
                Ok(RawPageRecord {
                    list_id: row.get(0)?,
                    url: row.get(1)?,
                    url_md5: row.get(2)?,
                    page_content: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Gets the most recent runs, newest first
    pub fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source_id, started_at, finished_at, options, attempted, succeeded
             FROM runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit as i64], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    source_id: row.get(1)?,
                    started_at: row.get(2)?,
                    finished_at: row.get(3)?,
                    options: row.get(4)?,
                    attempted: row.get::<_, Option<i64>>(5)?.map(|n| n as u64),
                    succeeded: row.get::<_, Option<i64>>(6)?.map(|n| n as u64),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    // ===== Statistics =====

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn count_targets(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM crawl_list")
    }

    pub fn count_crawled_targets(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM crawl_list WHERE crawler_count > 0")
    }

    pub fn count_errored_targets(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM crawl_list WHERE error_count > 0")
    }

    /// Counts targets the current policy would still load, across all sources
    pub fn count_pending_targets(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM crawl_list WHERE crawler_count = 0 AND error_count < ?1",
            params![self.policy.max_error_count],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    pub fn count_pages(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages")
    }

    pub fn count_images(&self) -> StorageResult<u64> {
        self.count("SELECT COALESCE(SUM(image), 0) FROM pages")
    }

    pub fn count_videos(&self) -> StorageResult<u64> {
        self.count("SELECT COALESCE(SUM(video), 0) FROM pages")
    }

    pub fn count_raw_pages(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM page_raw")
    }

    pub fn count_visual_links(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM visual_links")
    }

    fn try_insert_page(&mut self, page: &ArticlePage) -> StorageResult<()> {
        let authors = serde_json::to_string(&page.authors)?;
        let keywords = serde_json::to_string(&page.keywords)?;

        self.conn.execute(
            "INSERT INTO pages (source_id, list_id, url, url_md5, redirected_url, title, body,
             publish_time, authors, keywords, image, video, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(url_md5) DO UPDATE SET
                redirected_url = excluded.redirected_url,
                title = excluded.title,
                body = excluded.body,
                publish_time = excluded.publish_time,
                authors = excluded.authors,
                keywords = excluded.keywords,
                image = excluded.image,
                video = excluded.video",
            params![
                page.source_id,
                page.list_id,
                page.url,
                page.url_md5,
                page.redirected_url,
                page.title,
                page.body,
                page.publish_time,
                authors,
                keywords,
                page.image_count as i64,
                page.video_count as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn bump_counter(&mut self, column: &str, url_md5: &str) -> StorageResult<()> {
        let sql = format!(
            "UPDATE crawl_list SET {column} = {column} + 1, updated_at = ?1 WHERE url_md5 = ?2"
        );
        let updated = self
            .conn
            .execute(&sql, params![Utc::now().to_rfc3339(), url_md5])?;

        if updated == 0 {
            return Err(StorageError::TargetNotFound(url_md5.to_string()));
        }
        Ok(())
    }
}

impl Storage for SqliteStorage {
    // ===== Source & Batch =====

    fn get_source_id(&self, code: &str) -> StorageResult<i64> {
        self.conn
            .query_row(
                "SELECT id FROM sources WHERE code = ?1",
                params![code],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StorageError::SourceNotFound(code.to_string()))
    }

    fn get_crawl_list(&self, source_id: i64) -> StorageResult<Vec<CrawlTarget>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = self.policy.batch_limit.map(|n| n as i64).unwrap_or(-1);

        let mut stmt = self.conn.prepare(
            "SELECT id, url, url_md5, crawler_count, error_count FROM crawl_list
             WHERE source_id = ?1 AND crawler_count = 0 AND error_count < ?2
             ORDER BY id ASC LIMIT ?3",
        )?;

        let targets = stmt
            .query_map(
                params![source_id, self.policy.max_error_count, limit],
                |row| {
                    Ok(CrawlTarget {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        url_md5: row.get(2)?,
                        crawl_count: row.get(3)?,
                        error_count: row.get(4)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(targets)
    }

    // ===== Results =====

    fn insert_page_raw(&mut self, record: &RawPageRecord) -> bool {
        let result = self.conn.execute(
            "INSERT INTO page_raw (list_id, url, url_md5, page_content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.list_id,
                record.url,
                record.url_md5,
                record.page_content,
                Utc::now().to_rfc3339()
            ],
        );

        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(url_md5 = %record.url_md5, error = %e, "Failed to insert raw page");
                false
            }
        }
    }

    fn insert_page(&mut self, page: &ArticlePage) -> bool {
        match self.try_insert_page(page) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(url_md5 = %page.url_md5, error = %e, "Failed to insert page");
                false
            }
        }
    }

    fn insert_visual_link(&mut self, visual: &VisualContent) -> bool {
        let (Some(list_id), Some(url_md5)) = (visual.list_id, visual.url_md5.as_deref()) else {
            tracing::error!(
                visual_src = %visual.visual_src,
                "Visual link is not attached to a crawl target"
            );
            return false;
        };

        let result = self.conn.execute(
            "INSERT OR IGNORE INTO visual_links (list_id, url_md5, type, visual_src, caption, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                list_id,
                url_md5,
                visual.kind.to_db_code(),
                visual.visual_src,
                visual.caption,
                Utc::now().to_rfc3339()
            ],
        );

        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(%url_md5, error = %e, "Failed to insert visual link");
                false
            }
        }
    }

    // ===== Counters =====

    fn update_list_crawlercount(&mut self, url_md5: &str) -> StorageResult<()> {
        self.bump_counter("crawler_count", url_md5)
    }

    fn update_list_errorcount(&mut self, url_md5: &str) -> StorageResult<()> {
        self.bump_counter("error_count", url_md5)
    }

    // ===== Run Telemetry =====

    fn start_run(&mut self, source_id: i64, options: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (source_id, started_at, options) VALUES (?1, ?2, ?3)",
            params![source_id, Utc::now().to_rfc3339(), options],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE runs SET finished_at = ?1, attempted = ?2, succeeded = ?3 WHERE id = ?4",
            params![
                Utc::now().to_rfc3339(),
                summary.attempted as i64,
                summary.succeeded as i64,
                run_id
            ],
        )?;
        Ok(())
    }
}
