//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Presswire database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- News sites, one row per site profile code
CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Article URLs queued for crawling, with per-target counters
CREATE TABLE IF NOT EXISTS crawl_list (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL REFERENCES sources(id),
    url TEXT NOT NULL,
    url_md5 TEXT NOT NULL UNIQUE,
    crawler_count INTEGER NOT NULL DEFAULT 0,
    error_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_crawl_list_source ON crawl_list(source_id);

-- Extracted articles, one row per target
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL REFERENCES sources(id),
    list_id INTEGER NOT NULL REFERENCES crawl_list(id),
    url TEXT NOT NULL,
    url_md5 TEXT NOT NULL UNIQUE,
    redirected_url TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    publish_time TEXT NOT NULL,
    authors TEXT NOT NULL,
    keywords TEXT NOT NULL,
    image INTEGER NOT NULL DEFAULT 0,
    video INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Compacted raw HTML snapshots
CREATE TABLE IF NOT EXISTS page_raw (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    list_id INTEGER NOT NULL REFERENCES crawl_list(id),
    url TEXT NOT NULL,
    url_md5 TEXT NOT NULL,
    page_content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_page_raw_md5 ON page_raw(url_md5);

-- Images and videos referenced by articles
CREATE TABLE IF NOT EXISTS visual_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    list_id INTEGER NOT NULL REFERENCES crawl_list(id),
    url_md5 TEXT NOT NULL,
    type INTEGER NOT NULL,
    visual_src TEXT NOT NULL,
    caption TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(url_md5, visual_src)
);

-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL REFERENCES sources(id),
    started_at TEXT NOT NULL,
    finished_at TEXT,
    options TEXT NOT NULL,
    attempted INTEGER,
    succeeded INTEGER
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
