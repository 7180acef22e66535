//! Visual content classification
//!
//! Collects the cover image, inline images and embedded video of an article
//! page. Output order is always cover, inline images in document order, then
//! the video.

use crate::extract::profile::ExtractionRules;
use crate::extract::types::VisualContent;
use crate::extract::{compile_selector, element_text, ExtractError};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Finds a video identifier inside inline script text
///
/// Kept apart from the classifier because it depends on the exact shape of
/// the site's player bootstrap script.
#[derive(Debug, Clone)]
pub struct VideoIdMatcher {
    pattern: Regex,
    embed_prefix: String,
}

impl VideoIdMatcher {
    pub fn new(pattern: &str, embed_prefix: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            embed_prefix: embed_prefix.to_string(),
        })
    }

    /// Returns the first capture of the pattern in `script`
    pub fn find_id<'a>(&self, script: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(script)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn embed_url(&self, id: &str) -> String {
        format!("{}{}", self.embed_prefix, id)
    }
}

/// Extracts image and video references from an article document
#[derive(Debug, Clone)]
pub struct VisualContentClassifier {
    article: Selector,
    cover: Selector,
    cover_caption: Selector,
    inline_image: Selector,
    inline_caption: Selector,
    image: Selector,
    video: Selector,
    video_script: Selector,
    video_caption: Selector,
    video_id: VideoIdMatcher,
}

impl VisualContentClassifier {
    pub fn new(rules: &ExtractionRules) -> Result<Self, ExtractError> {
        Ok(Self {
            article: compile_selector("article", rules.article)?,
            cover: compile_selector("cover", rules.cover)?,
            cover_caption: compile_selector("cover_caption", rules.cover_caption)?,
            inline_image: compile_selector("inline_image", rules.inline_image)?,
            inline_caption: compile_selector("inline_caption", rules.inline_caption)?,
            image: compile_selector("image", rules.image)?,
            video: compile_selector("video", rules.video)?,
            video_script: compile_selector("video_script", rules.video_script)?,
            video_caption: compile_selector("video_caption", rules.video_caption)?,
            video_id: VideoIdMatcher::new(rules.video_id_pattern, rules.video_embed_prefix)?,
        })
    }

    /// Classifies all visual content in `document`
    pub fn classify(&self, document: &Html) -> Vec<VisualContent> {
        let mut visuals = Vec::new();

        if let Some(cover) = self.cover_image(document) {
            visuals.push(cover);
        }

        if let Some(article) = document.select(&self.article).next() {
            visuals.extend(self.inline_images(article));
        }

        if let Some(video) = self.video(document) {
            visuals.push(video);
        }

        visuals
    }

    fn cover_image(&self, document: &Html) -> Option<VisualContent> {
        let container = document.select(&self.cover).next()?;
        let src = self.image_src(container)?;
        let caption = container
            .select(&self.cover_caption)
            .next()
            .and_then(|link| link.value().attr("title"))
            .unwrap_or_default()
            .to_string();

        Some(VisualContent::image(src, caption))
    }

    fn inline_images<'a>(
        &'a self,
        article: ElementRef<'a>,
    ) -> impl Iterator<Item = VisualContent> + 'a {
        article.select(&self.inline_image).filter_map(move |container| {
            let src = self.image_src(container)?;
            let caption = container
                .select(&self.inline_caption)
                .next()
                .map(|span| element_text(span).trim().to_string())
                .unwrap_or_default();

            Some(VisualContent::image(src, caption))
        })
    }

    fn video(&self, document: &Html) -> Option<VisualContent> {
        let container = document.select(&self.video).next()?;
        let scope = container.parent().and_then(ElementRef::wrap)?;

        let id = scope.select(&self.video_script).find_map(|script| {
            let text = element_text(script);
            self.video_id.find_id(&text).map(str::to_string)
        })?;

        let caption = container
            .select(&self.video_caption)
            .next()
            .map(|fig| element_text(fig).trim().to_string())
            .unwrap_or_default();

        Some(VisualContent::video(self.video_id.embed_url(&id), caption))
    }

    fn image_src(&self, container: ElementRef<'_>) -> Option<String> {
        container
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(absolutize_src)
    }
}

/// Prepends `https:` to protocol-relative sources
pub fn absolutize_src(src: &str) -> String {
    if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    }
}
