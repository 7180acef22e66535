//! Presswire main entry point
//!
//! This is the command-line interface for the Presswire article harvester.

use anyhow::{bail, Context};
use clap::Parser;
use presswire::config::{load_config_with_hash, Config};
use presswire::crawler::{crawl, queue_targets, RunOptions};
use presswire::extract::profile_for;
use presswire::storage::{open_storage, CrawlListPolicy, SqliteStorage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Presswire: a polite single-source news article harvester
///
/// Presswire fetches the article pages queued for one news site, extracts
/// title, body, publish time, authors, keywords and media, and records the
/// outcome of every page in its database.
#[derive(Parser, Debug)]
#[command(name = "presswire")]
#[command(version)]
#[command(about = "A polite single-source news article harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Save a compacted copy of every fetched page
    #[arg(long)]
    raw: bool,

    /// Save image and video references as separate rows
    #[arg(long)]
    visual: bool,

    /// Accepted for compatibility; has no effect
    #[arg(long)]
    diff: bool,

    /// Process at most this many targets
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    limit: Option<u64>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "add_url"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "add_url"])]
    stats: bool,

    /// Queue article URLs for the configured source and exit
    #[arg(long, value_name = "URL", num_args = 1.., conflicts_with_all = ["dry_run", "stats"])]
    add_url: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(limit) = cli.limit {
        config.crawler.batch_limit = Some(limit as usize);
    }

    let mut options = RunOptions::from(&config.options);
    options.persist_raw |= cli.raw;
    options.persist_visual |= cli.visual;
    options.page_diff |= cli.diff;

    if cli.dry_run {
        handle_dry_run(&config, options)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if !cli.add_url.is_empty() {
        handle_add_urls(&config, &cli.add_url)?;
    } else {
        handle_crawl(&config, options).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("presswire=info,warn"),
            1 => EnvFilter::new("presswire=debug,info"),
            2 => EnvFilter::new("presswire=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.storage.database_path);
    let storage = open_storage(path)
        .with_context(|| format!("failed to open database {}", path.display()))?;

    Ok(storage.with_policy(CrawlListPolicy {
        max_error_count: config.crawler.max_error_count,
        batch_limit: config.crawler.batch_limit,
    }))
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config, options: RunOptions) -> anyhow::Result<()> {
    println!("=== Presswire Dry Run ===\n");

    println!("Source:");
    println!("  Code: {}", config.source.code);
    if let Some(name) = &config.source.name {
        println!("  Name: {}", name);
    }

    println!("\nCrawler Configuration:");
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!(
        "  Delay between targets: {}-{}s",
        config.crawler.min_delay_secs, config.crawler.max_delay_secs
    );
    println!("  Max error count: {}", config.crawler.max_error_count);
    match config.crawler.batch_limit {
        Some(limit) => println!("  Batch limit: {}", limit),
        None => println!("  Batch limit: none"),
    }

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nOptions: {}", options.describe());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use presswire::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.storage.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage, 10)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --add-url mode: queues article URLs for the configured source
fn handle_add_urls(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    let Some(profile) = profile_for(&config.source.code) else {
        bail!("no site profile for source code '{}'", config.source.code);
    };

    let mut storage = open_database(config)?;
    let name = config
        .source
        .name
        .as_deref()
        .unwrap_or(profile.display_name());
    let source_id = storage.register_source(profile.code(), name)?;

    let added = queue_targets(&mut storage, source_id, urls)?;

    println!("✓ Queued {} of {} URLs", added, urls.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, options: RunOptions) -> anyhow::Result<()> {
    match crawl(config, options).await {
        Ok(summary) => {
            println!(
                "✓ Crawled {} targets: {} persisted, {} failed",
                summary.attempted,
                summary.succeeded,
                summary.failed()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
