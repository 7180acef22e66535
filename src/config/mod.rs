//! Configuration module for Presswire
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use presswire::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("presswire.toml")).unwrap();
//! println!("Crawling source: {}", config.source.code);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OptionsConfig, SourceConfig, StorageConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
