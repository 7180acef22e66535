//! Raw HTML compaction for archived page snapshots

use regex::Regex;

/// Shrinks HTML documents for archival
///
/// Drops comments, removes whitespace between tags and collapses every other
/// whitespace run to a single space. Text inside `<pre>` is not protected.
#[derive(Debug, Clone)]
pub struct HtmlMinifier {
    comment: Regex,
    inter_tag: Regex,
    whitespace: Regex,
}

impl HtmlMinifier {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            comment: Regex::new(r"(?s)<!--.*?-->")?,
            inter_tag: Regex::new(r">\s+<")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    pub fn minify(&self, html: &str) -> String {
        let without_comments = self.comment.replace_all(html, "");
        let tight = self.inter_tag.replace_all(&without_comments, "><");
        self.whitespace
            .replace_all(&tight, " ")
            .trim()
            .to_string()
    }
}
