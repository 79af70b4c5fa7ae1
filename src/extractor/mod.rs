pub mod collector;
pub mod container;
pub mod dom;
pub mod errors;
pub mod escalator;
pub mod model;
pub mod normalizer;

#[cfg(test)]
mod tests;

pub use container::ContentArea;
pub use errors::ExtractError;
pub use model::{
    ContentItem, ContentKind, Extraction, ExtractionOptions, ExtractionTier, SelectionStrategy,
};

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::extractor::collector::{Collector, ImageRules};
use crate::extractor::container::ContainerSelector;
use crate::extractor::escalator::Escalator;
use crate::fetcher::types::PageResponse;

/// Ordered text/image extraction for forum posts.
///
/// Built once per crawl; holds only compiled selectors, so extracting a
/// document never touches shared mutable state.
pub struct Extractor {
    site_origin: Url,
    container: ContainerSelector,
    escalator: Escalator,
}

impl Extractor {
    pub fn new(site_origin: Url, options: ExtractionOptions) -> Result<Self, ExtractError> {
        let signatures = options
            .container_signatures
            .iter()
            .map(String::as_str)
            .map(parse_selector)
            .collect::<Result<Vec<_>, _>>()?;
        let class_pattern = Regex::new(&options.fallback_class_pattern).map_err(|e| {
            ExtractError::InvalidPattern {
                pattern: options.fallback_class_pattern.clone(),
                reason: e.to_string(),
            }
        })?;
        let container = ContainerSelector::new(
            signatures,
            parse_selector(&options.fallback_container_selector)?,
            class_pattern,
        );

        let collector = Collector::new(
            parse_selector(&options.image_selector)?,
            parse_selector(&options.paragraph_selector)?,
            ImageRules {
                source_attrs: options.image_source_attrs,
                denylist: options.image_denylist,
            },
            options.min_text_chars,
        );
        let escalator = Escalator::new(
            collector,
            parse_selector(&options.coarse_image_selector)?,
            ImageRules {
                source_attrs: options.coarse_image_source_attrs,
                denylist: options.coarse_image_denylist,
            },
            options.min_text_chars,
            options.line_split_spacing,
            options.min_items,
            options.coarse_min_total_chars,
        );

        Ok(Self {
            site_origin,
            container,
            escalator,
        })
    }

    pub fn with_defaults(site_origin: Url) -> Result<Self, ExtractError> {
        Self::new(site_origin, ExtractionOptions::default())
    }

    /// Extract the post body of `html`, fetched from `page_url`.
    ///
    /// Items come back densely numbered from 1. An `Extraction` with no items
    /// is possible when every tier comes up empty.
    pub fn extract(&self, html: &str, page_url: &Url) -> Result<Extraction, ExtractError> {
        let document = Html::parse_document(html);
        let area = self
            .container
            .select(&document)
            .ok_or(ExtractError::ContainerNotFound)?;

        let (tier, items) = self.escalator.run(&area, page_url, &self.site_origin);

        Ok(Extraction {
            strategy: area.strategy,
            tier,
            items,
        })
    }

    pub fn extract_page(&self, resp: &PageResponse) -> Result<Extraction, ExtractError> {
        self.extract(&resp.body_utf8, &resp.url_final)
    }
}

fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}
