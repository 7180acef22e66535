//! Output module for reporting crawl results
//!
//! This module handles printing statistics gathered from the database.

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};
