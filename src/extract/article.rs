//! Article field extraction
//!
//! Every structural lookup is optional: a page missing a required node
//! yields `ExtractError::MissingElement` instead of a panic, so one malformed
//! page never takes down the batch it belongs to.

use crate::extract::profile::{ExtractionRules, SiteProfile};
use crate::extract::time::normalize_time;
use crate::extract::types::ArticleContent;
use crate::extract::visual::VisualContentClassifier;
use crate::extract::{compile_selector, element_text, ExtractError};
use scraper::{ElementRef, Html, Selector};

/// Compiled extraction rules for one site profile
#[derive(Debug, Clone)]
pub struct Extractor {
    rules: ExtractionRules,
    title: Selector,
    article: Selector,
    paragraph: Selector,
    publish_time: Selector,
    byline: Selector,
    cited_author: Selector,
    keywords: Selector,
    visuals: VisualContentClassifier,
}

impl Extractor {
    /// Compiles the profile's selectors and patterns
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - All rules compiled
    /// * `Err(ExtractError)` - A selector or the video pattern is malformed
    pub fn new(profile: &dyn SiteProfile) -> Result<Self, ExtractError> {
        let rules = profile.rules().clone();

        Ok(Self {
            title: compile_selector("title", rules.title)?,
            article: compile_selector("article", rules.article)?,
            paragraph: compile_selector("paragraph", rules.paragraph)?,
            publish_time: compile_selector("publish_time", rules.publish_time)?,
            byline: compile_selector("byline", rules.byline)?,
            cited_author: compile_selector("cited_author", rules.cited_author)?,
            keywords: compile_selector("keywords", rules.keywords)?,
            visuals: VisualContentClassifier::new(&rules)?,
            rules,
        })
    }

    /// Parses raw HTML and extracts the article
    pub fn extract(&self, html: &str) -> Result<ArticleContent, ExtractError> {
        let document = Html::parse_document(html);
        self.extract_document(&document)
    }

    /// Extracts the article from an already parsed document
    pub fn extract_document(&self, document: &Html) -> Result<ArticleContent, ExtractError> {
        let title = document
            .select(&self.title)
            .next()
            .map(|el| element_text(el).trim().to_string())
            .ok_or_else(|| self.missing("title", self.rules.title))?;

        let article = document
            .select(&self.article)
            .next()
            .ok_or_else(|| self.missing("article", self.rules.article))?;

        let body = article
            .select(&self.paragraph)
            .map(element_text)
            .collect::<Vec<_>>()
            .join("\n");

        let publish_time = self.publish_time(article)?;
        let authors = self.authors(article)?;
        let keywords = self.keywords(document);
        let visual_contents = self.visuals.classify(document);

        Ok(ArticleContent {
            title,
            body,
            publish_time,
            authors,
            keywords,
            visual_contents,
        })
    }

    fn publish_time(&self, article: ElementRef<'_>) -> Result<String, ExtractError> {
        let node = article
            .select(&self.publish_time)
            .next()
            .ok_or_else(|| self.missing("publish_time", self.rules.publish_time))?;

        Ok(normalize_time(
            &element_text(node),
            self.rules.publish_time_format,
        )?)
    }

    /// A cited author wins; otherwise the byline text up to the first delimiter.
    ///
    /// The split segment is kept verbatim, so `"張三 / 台北報導"` yields `"張三 "`.
    fn authors(&self, article: ElementRef<'_>) -> Result<Vec<String>, ExtractError> {
        let byline = article
            .select(&self.byline)
            .next()
            .ok_or_else(|| self.missing("byline", self.rules.byline))?;

        if let Some(cite) = byline.select(&self.cited_author).next() {
            return Ok(vec![element_text(cite).trim().to_string()]);
        }

        let text = element_text(byline);
        let author = text
            .trim()
            .split(self.rules.byline_delimiter)
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(vec![author])
    }

    fn keywords(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.keywords)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(|content| {
                content
                    .trim()
                    .split(',')
                    .map(|k| k.trim().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn missing(&self, rule: &'static str, selector: &'static str) -> ExtractError {
        ExtractError::MissingElement { rule, selector }
    }
}
