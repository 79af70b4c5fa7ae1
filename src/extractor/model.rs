use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Image,
}

/// One entry of an extracted post, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    /// Cleaned text, or an absolute image URL.
    pub value: String,
    /// Dense, 1-based position within the post.
    pub order: u32,
}

/// Ordering proxy for a candidate. Only comparable within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionKey(pub usize);

/// A content unit found during traversal, not yet cleaned or numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: ContentKind,
    pub raw_value: String,
    pub position: PositionKey,
}

impl Candidate {
    pub fn text(raw_value: impl Into<String>, position: usize) -> Self {
        Self {
            kind: ContentKind::Text,
            raw_value: raw_value.into(),
            position: PositionKey(position),
        }
    }

    pub fn image(url: impl Into<String>, position: usize) -> Self {
        Self {
            kind: ContentKind::Image,
            raw_value: url.into(),
            position: PositionKey(position),
        }
    }
}

/// How the content area was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Matched the known container signature at this index.
    Signature(usize),
    /// Largest text-bearing element among loosely matching classes.
    LargestText,
}

/// Which rung of the fallback ladder produced the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionTier {
    /// `<p>` text and images interleaved by document position.
    Paragraph,
    /// Blank-line separated text segments with synthetic positions.
    LineSplit,
    /// All images first, then all text lines. Order is not reading order.
    Coarse,
}

impl fmt::Display for ExtractionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Paragraph => "paragraph",
            Self::LineSplit => "line_split",
            Self::Coarse => "coarse",
        };
        f.write_str(name)
    }
}

/// Output of one document's extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub strategy: SelectionStrategy,
    pub tier: ExtractionTier,
    pub items: Vec<ContentItem>,
}

impl Extraction {
    pub fn text_count(&self) -> usize {
        self.count(ContentKind::Text)
    }

    pub fn image_count(&self) -> usize {
        self.count(ContentKind::Image)
    }

    fn count(&self, kind: ContentKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }
}

/// Tunables of the extraction heuristics. The defaults are the values that
/// work for the forum's discussion-topic layout; nothing about them is known
/// to carry over to other sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// CSS selectors tried in order; the first match is the content area.
    pub container_signatures: Vec<String>,
    /// Elements scanned when no signature matches.
    pub fallback_container_selector: String,
    /// Pattern the `class` attribute of a scanned element has to match.
    pub fallback_class_pattern: String,
    pub image_selector: String,
    pub paragraph_selector: String,
    /// Image scope of the coarse tier.
    pub coarse_image_selector: String,
    /// Source attributes, first non-empty wins.
    pub image_source_attrs: Vec<String>,
    pub coarse_image_source_attrs: Vec<String>,
    /// Case-insensitive URL substrings marking decorative images.
    pub image_denylist: Vec<String>,
    pub coarse_image_denylist: Vec<String>,
    /// Shortest text kept, in chars after cleaning.
    pub min_text_chars: usize,
    /// Gap between synthetic positions of line-split segments.
    pub line_split_spacing: usize,
    /// Fewer items than this after paragraph/line-split sends the document
    /// to the coarse tier.
    pub min_items: usize,
    /// The coarse tier only emits text when the area holds more chars than this.
    pub coarse_min_total_chars: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            container_signatures: strings(&[
                "div.topic-doc",
                "div.topic-content",
                "div#link-report",
                "div.rich-content",
                "div.article",
            ]),
            fallback_container_selector: "div[class]".to_string(),
            fallback_class_pattern: "topic|content|doc|article".to_string(),
            image_selector: "img".to_string(),
            paragraph_selector: "p".to_string(),
            coarse_image_selector: "img".to_string(),
            image_source_attrs: strings(&["src", "data-src", "data-origin"]),
            coarse_image_source_attrs: strings(&["src", "data-src"]),
            image_denylist: strings(&["icon", "avatar", "emoji"]),
            coarse_image_denylist: strings(&["icon", "avatar"]),
            min_text_chars: 4,
            line_split_spacing: 1000,
            min_items: 2,
            coarse_min_total_chars: 10,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Collapse every whitespace run (including full-width and non-breaking
/// spaces) to a single space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
