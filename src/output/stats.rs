//! Statistics generation from crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::storage::{RunRecord, SqliteStorage};
use crate::PresswireError;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of queued targets
    pub total_targets: u64,

    /// Targets still eligible for crawling
    pub pending_targets: u64,

    /// Targets with at least one successful crawl
    pub crawled_targets: u64,

    /// Targets with at least one recorded error
    pub errored_targets: u64,

    /// Stored articles
    pub pages: u64,

    /// Images and videos referenced by stored articles
    pub images: u64,
    pub videos: u64,

    /// Raw snapshots and visual link rows
    pub raw_pages: u64,
    pub visual_links: u64,

    /// Most recent runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `run_limit` - How many recent runs to include
pub fn load_statistics(
    storage: &SqliteStorage,
    run_limit: usize,
) -> Result<CrawlStatistics, PresswireError> {
    Ok(CrawlStatistics {
        total_targets: storage.count_targets()?,
        pending_targets: storage.count_pending_targets()?,
        crawled_targets: storage.count_crawled_targets()?,
        errored_targets: storage.count_errored_targets()?,
        pages: storage.count_pages()?,
        images: storage.count_images()?,
        videos: storage.count_videos()?,
        raw_pages: storage.count_raw_pages()?,
        visual_links: storage.count_visual_links()?,
        recent_runs: storage.recent_runs(run_limit)?,
    })
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0
fn percentage(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Targets:");
    println!("  Total: {}", stats.total_targets);
    println!("  Pending: {}", stats.pending_targets);
    println!(
        "  Crawled: {} ({:.1}%)",
        stats.crawled_targets,
        percentage(stats.crawled_targets, stats.total_targets)
    );
    println!(
        "  With errors: {} ({:.1}%)",
        stats.errored_targets,
        percentage(stats.errored_targets, stats.total_targets)
    );
    println!();

    println!("Articles:");
    println!("  Stored pages: {}", stats.pages);
    println!("  Images: {}", stats.images);
    println!("  Videos: {}", stats.videos);
    println!("  Raw snapshots: {}", stats.raw_pages);
    println!("  Visual links: {}", stats.visual_links);
    println!();

    if !stats.recent_runs.is_empty() {
        println!("Recent Runs ({}):", stats.recent_runs.len());
        for run in &stats.recent_runs {
            match (run.attempted, run.succeeded) {
                (Some(attempted), Some(succeeded)) => println!(
                    "  #{} {} [{}] {} / {} persisted",
                    run.id, run.started_at, run.options, succeeded, attempted
                ),
                _ => println!(
                    "  #{} {} [{}] unfinished",
                    run.id, run.started_at, run.options
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{url_md5, Storage};

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn test_load_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let source_id = storage.register_source("cnt", "China Times").unwrap();
        for n in 1..=3 {
            storage
                .add_crawl_target(source_id, &format!("https://news.example.com/{}", n))
                .unwrap();
        }
        storage
            .update_list_errorcount(&url_md5("https://news.example.com/1"))
            .unwrap();
        storage.start_run(source_id, "none").unwrap();

        let stats = load_statistics(&storage, 5).unwrap();
        assert_eq!(stats.total_targets, 3);
        assert_eq!(stats.pending_targets, 3);
        assert_eq!(stats.errored_targets, 1);
        assert_eq!(stats.crawled_targets, 0);
        assert_eq!(stats.pages, 0);
        assert_eq!(stats.recent_runs.len(), 1);
    }
}
