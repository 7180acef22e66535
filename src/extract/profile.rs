//! Site profiles
//!
//! A profile describes where a news site keeps each article field. The
//! extractor only ever consults these rules, so supporting another site means
//! adding a profile rather than touching extraction logic.

use crate::extract::time::ZH_TW_FORMAT;

/// Declarative CSS selector rules for one site's article pages
///
/// Selectors marked "within" are evaluated relative to the named container;
/// all others are evaluated against the whole document.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    /// Headline node
    pub title: &'static str,
    /// Article container
    pub article: &'static str,
    /// Body paragraphs, within `article`
    pub paragraph: &'static str,
    /// Publish-time node, within `article`
    pub publish_time: &'static str,
    /// Locale format of the publish-time text
    pub publish_time_format: &'static str,
    /// Byline container, within `article`
    pub byline: &'static str,
    /// Cited author node, within `byline`
    pub cited_author: &'static str,
    /// Delimiter between the author and the rest of a plain byline
    pub byline_delimiter: char,
    /// Meta node whose `content` holds comma-separated keywords
    pub keywords: &'static str,
    /// Cover image container
    pub cover: &'static str,
    /// Element within `cover` whose `title` attribute is the caption
    pub cover_caption: &'static str,
    /// Inline image containers, within `article`
    pub inline_image: &'static str,
    /// Caption node, within `inline_image`
    pub inline_caption: &'static str,
    /// Image element, within `cover` or `inline_image`
    pub image: &'static str,
    /// Video container
    pub video: &'static str,
    /// Script nodes, within the video container's parent
    pub video_script: &'static str,
    /// Caption node, within `video`
    pub video_caption: &'static str,
    /// Pattern whose first capture group is the video identifier
    pub video_id_pattern: &'static str,
    /// Embed URL the identifier is appended to
    pub video_embed_prefix: &'static str,
}

/// A news site the crawler knows how to read
pub trait SiteProfile: Send + Sync {
    /// Short code used to look up the source in storage
    fn code(&self) -> &'static str;

    /// Display name used when registering the source
    fn display_name(&self) -> &'static str;

    fn rules(&self) -> &ExtractionRules;
}

/// China Times (中時新聞網) article pages
#[derive(Debug, Clone, Copy, Default)]
pub struct ChinaTimes;

const CHINA_TIMES_RULES: ExtractionRules = ExtractionRules {
    title: "div#bigpicbox h1#h1",
    article: "article.arttext",
    paragraph: "p",
    publish_time: "time",
    publish_time_format: ZH_TW_FORMAT,
    byline: "div.rp_name",
    cited_author: "cite",
    byline_delimiter: '/',
    keywords: r#"meta[name="news_keywords"]"#,
    cover: "div.picbox1",
    cover_caption: "a",
    inline_image: "div.picbox",
    inline_caption: "span",
    image: "img",
    video: "div.video",
    video_script: "script",
    video_caption: "figcaption",
    video_id_pattern: r"var yID = '(\w.*)';",
    video_embed_prefix: "https://www.youtube.com/embed/",
};

impl SiteProfile for ChinaTimes {
    fn code(&self) -> &'static str {
        "cnt"
    }

    fn display_name(&self) -> &'static str {
        "China Times"
    }

    fn rules(&self) -> &ExtractionRules {
        &CHINA_TIMES_RULES
    }
}

static PROFILES: &[&dyn SiteProfile] = &[&ChinaTimes];

/// Looks up the profile registered for a source code
pub fn profile_for(code: &str) -> Option<&'static dyn SiteProfile> {
    PROFILES.iter().copied().find(|p| p.code() == code)
}
