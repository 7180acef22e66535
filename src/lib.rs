//! Presswire: a polite single-source news article harvester
//!
//! This crate crawls the article pages queued for one news site, extracts a
//! structured article (title, body, publish time, authors, keywords, visual
//! content) from each page, and persists the article together with per-target
//! success/error counters.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Presswire operations
#[derive(Debug, Error)]
pub enum PresswireError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid target URL: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("No site profile registered for source code '{0}'")]
    UnknownProfile(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Presswire operations
pub type Result<T> = std::result::Result<T, PresswireError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOrchestrator, RunOptions, RunSummary};
pub use extract::{ArticlePage, Extractor, VisualContent, VisualKind};
