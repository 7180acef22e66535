//! Structured article types produced by extraction

use crate::storage::CrawlTarget;

/// Media kind of a visual content entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Image,
    Video,
}

impl VisualKind {
    /// Numeric code used in the `visual_links.type` column
    pub fn to_db_code(&self) -> i64 {
        match self {
            Self::Image => 1,
            Self::Video => 2,
        }
    }

    pub fn from_db_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Image),
            2 => Some(Self::Video),
            _ => None,
        }
    }
}

/// An image or video referenced by an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualContent {
    pub kind: VisualKind,
    pub visual_src: String,
    pub caption: String,
    /// Set once the entry is attached to a crawl target
    pub list_id: Option<i64>,
    pub url_md5: Option<String>,
}

impl VisualContent {
    pub fn image(visual_src: String, caption: String) -> Self {
        Self {
            kind: VisualKind::Image,
            visual_src,
            caption,
            list_id: None,
            url_md5: None,
        }
    }

    pub fn video(visual_src: String, caption: String) -> Self {
        Self {
            kind: VisualKind::Video,
            visual_src,
            caption,
            list_id: None,
            url_md5: None,
        }
    }
}

/// Fields read out of an article document, before it is tied to a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    pub title: String,
    pub body: String,
    /// Canonical `YYYY-MM-DD HH:MM:SS`
    pub publish_time: String,
    pub authors: Vec<String>,
    pub keywords: Vec<String>,
    /// Cover image, inline images, then video
    pub visual_contents: Vec<VisualContent>,
}

/// A fully assembled article, ready to be persisted
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub title: String,
    pub body: String,
    pub publish_time: String,
    pub authors: Vec<String>,
    pub keywords: Vec<String>,
    pub visual_contents: Vec<VisualContent>,
    pub image_count: usize,
    pub video_count: usize,
    pub url: String,
    pub url_md5: String,
    pub redirected_url: String,
    pub source_id: i64,
    pub list_id: i64,
}

impl ArticlePage {
    /// Ties extracted content to its crawl target
    ///
    /// Media counts are derived from `visual_contents`, and every visual entry
    /// is tagged with the target's `list_id` and `url_md5`.
    pub fn assemble(
        content: ArticleContent,
        target: &CrawlTarget,
        source_id: i64,
        redirected_url: String,
    ) -> Self {
        let visual_contents: Vec<VisualContent> = content
            .visual_contents
            .into_iter()
            .map(|visual| VisualContent {
                list_id: Some(target.id),
                url_md5: Some(target.url_md5.clone()),
                ..visual
            })
            .collect();

        let image_count = count_kind(&visual_contents, VisualKind::Image);
        let video_count = count_kind(&visual_contents, VisualKind::Video);

        Self {
            title: content.title,
            body: content.body,
            publish_time: content.publish_time,
            authors: content.authors,
            keywords: content.keywords,
            visual_contents,
            image_count,
            video_count,
            url: target.url.clone(),
            url_md5: target.url_md5.clone(),
            redirected_url,
            source_id,
            list_id: target.id,
        }
    }
}

fn count_kind(visuals: &[VisualContent], kind: VisualKind) -> usize {
    visuals.iter().filter(|v| v.kind == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> CrawlTarget {
        CrawlTarget {
            id: 7,
            url: "https://news.example.com/a".to_string(),
            url_md5: "abc123".to_string(),
            crawl_count: 0,
            error_count: 0,
        }
    }

    #[test]
    fn test_visual_kind_db_codes() {
        assert_eq!(VisualKind::Image.to_db_code(), 1);
        assert_eq!(VisualKind::Video.to_db_code(), 2);
        assert_eq!(VisualKind::from_db_code(2), Some(VisualKind::Video));
        assert_eq!(VisualKind::from_db_code(0), None);
    }

    #[test]
    fn test_assemble_counts_and_tags_visuals() {
        let content = ArticleContent {
            title: "t".to_string(),
            body: "b".to_string(),
            publish_time: "2023-05-01 13:45:00".to_string(),
            authors: vec!["a".to_string()],
            keywords: vec![],
            visual_contents: vec![
                VisualContent::image("https://img/1.jpg".to_string(), "c1".to_string()),
                VisualContent::image("https://img/2.jpg".to_string(), "c2".to_string()),
                VisualContent::video("https://v/x".to_string(), "v".to_string()),
            ],
        };

        let page = ArticlePage::assemble(content, &target(), 3, "https://r".to_string());

        assert_eq!(page.image_count, 2);
        assert_eq!(page.video_count, 1);
        assert_eq!(page.list_id, 7);
        assert_eq!(page.source_id, 3);
        assert_eq!(page.redirected_url, "https://r");
        assert!(page
            .visual_contents
            .iter()
            .all(|v| v.list_id == Some(7) && v.url_md5.as_deref() == Some("abc123")));
    }

    #[test]
    fn test_assemble_without_visuals() {
        let content = ArticleContent {
            title: "t".to_string(),
            body: String::new(),
            publish_time: "2023-05-01 13:45:00".to_string(),
            authors: vec!["a".to_string()],
            keywords: vec![],
            visual_contents: vec![],
        };

        let page = ArticlePage::assemble(content, &target(), 1, target().url);
        assert_eq!(page.image_count, 0);
        assert_eq!(page.video_count, 0);
    }
}
