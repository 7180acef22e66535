//! Article extraction
//!
//! This module turns a fetched article page into structured data:
//! - Site profiles describing where each field lives
//! - The extractor for title, body, publish time, authors and keywords
//! - Visual content (images and video) classification
//! - Publish-time normalization

mod article;
mod profile;
mod time;
mod types;
mod visual;

pub use article::Extractor;
pub use profile::{profile_for, ChinaTimes, ExtractionRules, SiteProfile};
pub use time::{normalize_time, TimeFormatError, CANONICAL_FORMAT, ZH_TW_FORMAT};
pub use types::{ArticleContent, ArticlePage, VisualContent, VisualKind};
pub use visual::{absolutize_src, VideoIdMatcher, VisualContentClassifier};

use scraper::{ElementRef, Selector};
use thiserror::Error;

/// Errors raised while extracting an article
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Required element '{rule}' not found (selector `{selector}`)")]
    MissingElement {
        rule: &'static str,
        selector: &'static str,
    },

    #[error("Invalid selector for '{rule}': {message}")]
    InvalidSelector { rule: &'static str, message: String },

    #[error("Invalid video id pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    TimeFormat(#[from] TimeFormatError),
}

pub(crate) fn compile_selector(
    rule: &'static str,
    selector: &'static str,
) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        rule,
        message: format!("{:?}", e),
    })
}

/// Concatenated text of an element and all its descendants
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
