//! Crawler module for article fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with failure classification
//! - Pacing between targets
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod pacer;

pub use coordinator::{error_chain, CrawlOrchestrator, RunOptions, RunSummary, TargetError};
pub use fetcher::{build_http_client, fetch_url, FetchError, FetchOutcome, HttpFetcher, PageFetcher};
pub use pacer::{Pacer, RandomPacer};

use crate::config::Config;
use crate::extract::profile_for;
use crate::storage::{CrawlListPolicy, SqliteStorage};
use crate::PresswireError;
use std::path::Path;

/// Runs a complete crawl operation for the configured source
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the storage layer and register the source
/// 2. Build the HTTP fetcher and pacer
/// 3. Process the pending batch
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `options` - Persistence switches for this run
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed
/// * `Err(PresswireError)` - Crawl could not start
pub async fn crawl(config: &Config, options: RunOptions) -> Result<RunSummary, PresswireError> {
    let profile = profile_for(&config.source.code)
        .ok_or_else(|| PresswireError::UnknownProfile(config.source.code.clone()))?;

    let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path))?
        .with_policy(CrawlListPolicy {
            max_error_count: config.crawler.max_error_count,
            batch_limit: config.crawler.batch_limit,
        });

    let name = config
        .source
        .name
        .as_deref()
        .unwrap_or(profile.display_name());
    storage.register_source(profile.code(), name)?;

    let fetcher = HttpFetcher::new(&config.crawler)?;
    let pacer = RandomPacer::from_config(&config.crawler);

    let mut orchestrator = CrawlOrchestrator::new(profile, fetcher, storage, pacer)?;
    orchestrator.run(options).await
}

/// Queues article URLs for a source and returns how many were new
///
/// Each URL must parse, but it is stored and hashed exactly as given, so the
/// `url_md5` matches what any other producer computes for the same text.
pub fn queue_targets(
    storage: &mut SqliteStorage,
    source_id: i64,
    urls: &[String],
) -> Result<usize, PresswireError> {
    let mut added = 0;
    for raw in urls {
        url::Url::parse(raw)?;
        match storage.add_crawl_target(source_id, raw)? {
            Some(list_id) => {
                tracing::info!(list_id, url = %raw, "Queued target");
                added += 1;
            }
            None => tracing::info!(url = %raw, "Target already queued"),
        }
    }
    Ok(added)
}

impl From<&crate::config::OptionsConfig> for RunOptions {
    fn from(options: &crate::config::OptionsConfig) -> Self {
        Self {
            persist_raw: options.page_raw,
            persist_visual: options.page_visual,
            page_diff: options.page_diff,
        }
    }
}
