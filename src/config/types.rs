use serde::Deserialize;

/// Desktop browser identity sent with every article request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

/// Main configuration structure for Presswire
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub options: OptionsConfig,
}

/// The news site being crawled
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Site profile code, also the lookup key for the source id in storage
    pub code: String,

    /// Human-readable name recorded when the source is registered
    #[serde(default)]
    pub name: Option<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header sent with each request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Lower bound of the pause between targets (seconds, inclusive)
    #[serde(rename = "min-delay-secs", default = "default_min_delay_secs")]
    pub min_delay_secs: u64,

    /// Upper bound of the pause between targets (seconds, inclusive)
    #[serde(rename = "max-delay-secs", default = "default_max_delay_secs")]
    pub max_delay_secs: u64,

    /// Targets that have failed this many times are no longer pending
    #[serde(rename = "max-error-count", default = "default_max_error_count")]
    pub max_error_count: u32,

    /// Upper bound on the number of targets processed in one run
    #[serde(rename = "batch-limit", default)]
    pub batch_limit: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            max_error_count: default_max_error_count(),
            batch_limit: None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Optional persistence switches for a run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsConfig {
    /// Store a compacted copy of each fetched page
    #[serde(rename = "page-raw", default)]
    pub page_raw: bool,

    /// Store one row per extracted image/video
    #[serde(rename = "page-visual", default)]
    pub page_visual: bool,

    /// Accepted for compatibility; has no effect
    #[serde(rename = "page-diff", default)]
    pub page_diff: bool,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_min_delay_secs() -> u64 {
    2
}

fn default_max_delay_secs() -> u64 {
    6
}

fn default_max_error_count() -> u32 {
    3
}
