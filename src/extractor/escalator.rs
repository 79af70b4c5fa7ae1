//! Fallback ladder over a content area.
//!
//! Paragraph → LineSplit → Coarse, each step taken only when the previous one
//! fails its acceptance predicate. Lower tiers are never revisited.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::debug;
use url::Url;

use crate::extractor::collector::{Collected, Collector, ImageRules};
use crate::extractor::container::ContentArea;
use crate::extractor::dom;
use crate::extractor::model::{Candidate, ContentItem, ExtractionTier, char_len};
use crate::extractor::normalizer::normalize;

static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Paragraph tier: at least one real `<p>` text.
pub fn accepts_paragraphs(collected: &Collected) -> bool {
    !collected.texts.is_empty()
}

/// Paragraph/LineSplit output is kept when it has at least `min_items` items.
pub fn accepts_merged(items: &[ContentItem], min_items: usize) -> bool {
    items.len() >= min_items
}

pub struct Escalator {
    collector: Collector,
    coarse_image_selector: Selector,
    coarse_images: ImageRules,
    min_text_chars: usize,
    line_split_spacing: usize,
    min_items: usize,
    coarse_min_total_chars: usize,
}

impl Escalator {
    pub fn new(
        collector: Collector,
        coarse_image_selector: Selector,
        coarse_images: ImageRules,
        min_text_chars: usize,
        line_split_spacing: usize,
        min_items: usize,
        coarse_min_total_chars: usize,
    ) -> Self {
        Self {
            collector,
            coarse_image_selector,
            coarse_images,
            min_text_chars,
            line_split_spacing,
            min_items,
            coarse_min_total_chars,
        }
    }

    pub fn run(
        &self,
        area: &ContentArea<'_>,
        page_url: &Url,
        site_origin: &Url,
    ) -> (ExtractionTier, Vec<ContentItem>) {
        let collected = self.collector.collect(area, page_url, site_origin);
        let paragraphs_found = accepts_paragraphs(&collected);
        let Collected { images, texts } = collected;

        let (tier, texts) = if paragraphs_found {
            (ExtractionTier::Paragraph, texts)
        } else {
            let segments = self.line_split(area.element);
            debug!(segments = segments.len(), "no paragraphs, splitting on blank lines");
            (ExtractionTier::LineSplit, segments)
        };

        let items = normalize(merge(images, texts), self.min_text_chars);
        if accepts_merged(&items, self.min_items) {
            return (tier, items);
        }

        debug!(tier = %tier, items = items.len(), "too few items, falling back to coarse");
        let coarse = self.coarse(area.element, page_url, site_origin);
        (ExtractionTier::Coarse, normalize(coarse, self.min_text_chars))
    }

    /// Blank-line separated segments of the area's text. Segment `i` is placed
    /// at `i * line_split_spacing`; images keep their real positions, so the
    /// interleave is approximate.
    fn line_split(&self, area: ElementRef<'_>) -> Vec<Candidate> {
        let full_text = dom::text_lines(area);
        if full_text.is_empty() {
            return Vec::new();
        }

        BLANK_LINES
            .split(&full_text)
            .enumerate()
            .filter_map(|(index, segment)| {
                let segment = segment.trim().replace('\n', " ");
                (char_len(&segment) >= self.min_text_chars)
                    .then(|| Candidate::text(segment, index.saturating_mul(self.line_split_spacing)))
            })
            .collect()
    }

    /// Every image first, in discovery order, then every text line.
    fn coarse(&self, area: ElementRef<'_>, page_url: &Url, site_origin: &Url) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = area
            .select(&self.coarse_image_selector)
            .filter_map(|element| self.coarse_images.url_of(element, page_url, site_origin))
            .enumerate()
            .map(|(index, url)| Candidate::image(url, index))
            .collect();

        let full_text = dom::text_lines(area);
        if char_len(&full_text) > self.coarse_min_total_chars {
            let offset = candidates.len();
            let lines = full_text
                .split('\n')
                .map(str::trim)
                .filter(|line| char_len(line) >= self.min_text_chars);
            candidates.extend(
                lines
                    .enumerate()
                    .map(|(index, line)| Candidate::text(line, offset + index)),
            );
        }

        candidates
    }
}

/// Stable merge by position. Images go in first, so an image wins a tie.
fn merge(images: Vec<Candidate>, texts: Vec<Candidate>) -> Vec<Candidate> {
    let mut all = images;
    all.extend(texts);
    all.sort_by_key(|candidate| candidate.position);
    all
}
