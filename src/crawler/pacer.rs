//! Inter-target pacing
//!
//! Targets are fetched one at a time with a random pause in between. The
//! pause is the only rate limiting applied to the source site.

use crate::config::CrawlerConfig;
use std::future::Future;
use std::time::Duration;

/// Waits between two consecutive targets
pub trait Pacer {
    /// Waits once and returns how long the pause was
    fn pause(&mut self) -> impl Future<Output = Duration> + Send;
}

/// Sleeps for a whole number of seconds drawn uniformly from `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomPacer {
    min_secs: u64,
    max_secs: u64,
}

impl RandomPacer {
    /// Creates a pacer; bounds given in reverse order are swapped
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: min_secs.max(max_secs),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.min_delay_secs, config.max_delay_secs)
    }

    /// Draws the next delay without sleeping
    pub fn sample(&self) -> Duration {
        Duration::from_secs(rand::random_range(self.min_secs..=self.max_secs))
    }
}

impl Default for RandomPacer {
    fn default() -> Self {
        Self::new(2, 6)
    }
}

impl Pacer for RandomPacer {
    async fn pause(&mut self) -> Duration {
        let delay = self.sample();
        tracing::debug!(delay_secs = delay.as_secs(), "Pausing before next target");
        tokio::time::sleep(delay).await;
        delay
    }
}
