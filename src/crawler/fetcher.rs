//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a browser-like identity
//! - GET requests with a bounded timeout
//! - Capturing the final URL after redirects
//! - Error classification
//!
//! Fetch failures are returned as values, never raised, and no retry happens
//! here: a failed target is simply retried on a later run.

use crate::config::CrawlerConfig;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Why a fetch produced no document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// DNS, connection, TLS, timeout or body read failure
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The server answered with a non-success status
    #[error("HTTP status error {status}: {message}")]
    HttpStatus { status: u16, message: String },
}

/// Result of fetching one article page
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Fetched {
        status_code: u16,
        /// Final URL after redirects
        redirected_url: String,
        raw_html: String,
    },
    Failed(FetchError),
}

/// Anything that can fetch an article page
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL with a single GET
///
/// # Returns
///
/// `FetchOutcome::Fetched` for 2xx responses, otherwise a classified failure.
pub async fn fetch_url(client: &Client, url: &str) -> FetchOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return FetchOutcome::Failed(classify_transport_error(&e)),
    };

    let status = response.status();
    let redirected_url = response.url().to_string();

    if !status.is_success() {
        return FetchOutcome::Failed(FetchError::HttpStatus {
            status: status.as_u16(),
            message: format!("{} returned {}", redirected_url, status),
        });
    }

    match response.text().await {
        Ok(raw_html) => FetchOutcome::Fetched {
            status_code: status.as_u16(),
            redirected_url,
            raw_html,
        },
        Err(e) => FetchOutcome::Failed(classify_transport_error(&e)),
    }
}

fn classify_transport_error(e: &reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        format!("Request timeout: {}", e)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_redirect() {
        format!("Redirect error: {}", e)
    } else {
        e.to_string()
    };

    FetchError::Transport { message }
}
