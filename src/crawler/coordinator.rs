//! Crawler coordinator - main crawl orchestration logic
//!
//! One run walks the pending batch of a single source strictly in order:
//! fetch, extract, persist, count, pause. Every target ends with exactly one
//! counter increment (crawl or error), and nothing that goes wrong with one
//! target stops the rest of the batch. Only resolving the source and loading
//! the batch can fail the run as a whole.

use crate::crawler::fetcher::{FetchError, FetchOutcome, PageFetcher};
use crate::crawler::pacer::Pacer;
use crate::extract::{ArticlePage, ExtractError, Extractor, SiteProfile};
use crate::storage::{CrawlTarget, HtmlMinifier, RawPageRecord, Storage};
use crate::PresswireError;
use std::error::Error as StdError;
use thiserror::Error;

/// Optional persistence switches for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Store a compacted copy of every fetched page
    pub persist_raw: bool,
    /// Store one row per extracted image/video
    pub persist_visual: bool,
    /// Accepted for compatibility; no diffing is performed
    pub page_diff: bool,
}

impl RunOptions {
    /// Comma-separated list of enabled options, or `none`
    pub fn describe(&self) -> String {
        let enabled: Vec<&str> = [
            (self.persist_raw, "raw"),
            (self.persist_visual, "visual"),
            (self.page_diff, "diff"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();

        if enabled.is_empty() {
            "none".to_string()
        } else {
            enabled.join(",")
        }
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Targets processed
    pub attempted: usize,
    /// Targets whose article was persisted
    pub succeeded: usize,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// Why a single target did not produce a stored article
#[derive(Debug, Error)]
pub enum TargetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to extract article")]
    Extract(#[from] ExtractError),

    #[error("Storage rejected the article")]
    PageNotStored,
}

impl TargetError {
    /// Whether the source site served a document for this target
    fn reached_site(&self) -> bool {
        !matches!(self, Self::Fetch(_))
    }
}

/// Main crawler coordinator structure
///
/// Collaborators are injected so each can be replaced in tests: the fetcher
/// talks to the site, the storage owns batch and counters, the pacer spaces
/// requests out.
pub struct CrawlOrchestrator<F, S, P> {
    source_code: String,
    extractor: Extractor,
    minifier: HtmlMinifier,
    fetcher: F,
    storage: S,
    pacer: P,
}

impl<F, S, P> CrawlOrchestrator<F, S, P>
where
    F: PageFetcher,
    S: Storage,
    P: Pacer,
{
    /// Creates a new coordinator for the given site profile
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOrchestrator)` - Ready to run
    /// * `Err(PresswireError)` - Extraction rules or minifier patterns do not compile
    pub fn new(
        profile: &dyn SiteProfile,
        fetcher: F,
        storage: S,
        pacer: P,
    ) -> Result<Self, PresswireError> {
        Ok(Self {
            source_code: profile.code().to_string(),
            extractor: Extractor::new(profile)?,
            minifier: HtmlMinifier::new()?,
            fetcher,
            storage,
            pacer,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Runs one crawl over the pending batch
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The batch was processed (individual targets may have failed)
    /// * `Err(PresswireError)` - The source or its batch could not be loaded
    pub async fn run(&mut self, options: RunOptions) -> Result<RunSummary, PresswireError> {
        let source_id = self.storage.get_source_id(&self.source_code)?;
        let batch = self.storage.get_crawl_list(source_id)?;

        tracing::info!(
            source = %self.source_code,
            batch = batch.len(),
            persist_raw = options.persist_raw,
            persist_visual = options.persist_visual,
            "Start crawling {} {}-news targets",
            batch.len(),
            self.source_code
        );

        let run_id = match self.storage.start_run(source_id, &options.describe()) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "Could not record run start");
                None
            }
        };

        let mut summary = RunSummary::default();

        for target in &batch {
            summary.attempted += 1;

            let result = self.process_target(source_id, target, &options).await;
            let reached_site = match &result {
                Ok(()) => {
                    summary.succeeded += 1;
                    self.count_success(target);
                    true
                }
                Err(e) => {
                    self.report_failure(target, e);
                    self.count_error(target);
                    e.reached_site()
                }
            };

            if reached_site {
                self.pacer.pause().await;
            }
        }

        if let Some(run_id) = run_id {
            if let Err(e) = self.storage.finish_run(run_id, &summary) {
                tracing::warn!(run_id, error = %e, "Could not record run finish");
            }
        }

        tracing::info!(
            source = %self.source_code,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            "Crawled {} {}-news targets",
            summary.succeeded,
            self.source_code
        );

        Ok(summary)
    }

    /// Fetches, extracts and persists one target
    async fn process_target(
        &mut self,
        source_id: i64,
        target: &CrawlTarget,
        options: &RunOptions,
    ) -> Result<(), TargetError> {
        let (redirected_url, raw_html) = match self.fetcher.fetch(&target.url).await {
            FetchOutcome::Fetched {
                status_code,
                redirected_url,
                raw_html,
            } => {
                tracing::debug!(list_id = target.id, status_code, "Fetched target");
                (redirected_url, raw_html)
            }
            FetchOutcome::Failed(e) => return Err(e.into()),
        };

        if options.persist_raw {
            let record = RawPageRecord::from_html(target, &raw_html, &self.minifier);
            if !self.storage.insert_page_raw(&record) {
                tracing::warn!(list_id = target.id, "Raw page was not saved");
            }
        }

        let content = self.extractor.extract(&raw_html)?;
        let page = ArticlePage::assemble(content, target, source_id, redirected_url);

        let stored = self.storage.insert_page(&page);

        // Visual rows are written whether or not the article row was accepted.
        if options.persist_visual && !page.visual_contents.is_empty() {
            self.persist_visuals(&page);
        }

        if stored {
            Ok(())
        } else {
            Err(TargetError::PageNotStored)
        }
    }

    fn persist_visuals(&mut self, page: &ArticlePage) {
        let failed = page
            .visual_contents
            .iter()
            .filter(|visual| !self.storage.insert_visual_link(visual))
            .count();

        if failed > 0 {
            tracing::warn!(
                list_id = page.list_id,
                failed,
                total = page.visual_contents.len(),
                "Some visual links were not saved"
            );
        }
    }

    fn report_failure(&self, target: &CrawlTarget, error: &TargetError) {
        match error {
            TargetError::Fetch(e) => {
                tracing::error!(list_id = target.id, url = %target.url, "Fetch failed: {}", e);
            }
            TargetError::PageNotStored => {
                tracing::warn!(list_id = target.id, url = %target.url, "{}", error);
            }
            TargetError::Extract(_) => {
                tracing::error!(
                    list_id = target.id,
                    url = %target.url,
                    url_md5 = %target.url_md5,
                    error = ?error,
                    "Target failed: {}",
                    error_chain(error)
                );
            }
        }
    }

    fn count_success(&mut self, target: &CrawlTarget) {
        if let Err(e) = self.storage.update_list_crawlercount(&target.url_md5) {
            tracing::error!(list_id = target.id, error = %e, "Could not update crawl count");
        }
    }

    fn count_error(&mut self, target: &CrawlTarget) {
        if let Err(e) = self.storage.update_list_errorcount(&target.url_md5) {
            tracing::error!(list_id = target.id, error = %e, "Could not update error count");
        }
    }
}

/// Renders an error and all of its sources on one line
pub fn error_chain(error: &dyn StdError) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
