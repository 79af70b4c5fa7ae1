use scraper::{ElementRef, Selector};
use url::Url;

use crate::extractor::container::ContentArea;
use crate::extractor::dom;
use crate::extractor::model::{Candidate, char_len};
use crate::extractor::normalizer::{is_decorative, resolve_image_url};

/// Where an image's URL comes from and which URLs are chrome.
#[derive(Debug, Clone)]
pub struct ImageRules {
    pub source_attrs: Vec<String>,
    pub denylist: Vec<String>,
}

impl ImageRules {
    /// Resolved, non-decorative URL of an image element, if any.
    pub fn url_of(&self, element: ElementRef<'_>, page_url: &Url, site_origin: &Url) -> Option<String> {
        let value = element.value();
        let raw = self
            .source_attrs
            .iter()
            .filter_map(|attr| value.attr(attr))
            .find(|src| !src.trim().is_empty())?;
        let url = resolve_image_url(raw, page_url, site_origin)?;
        (!is_decorative(&url, &self.denylist)).then_some(url)
    }
}

/// Candidates found in one content area, each carrying its document position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    pub images: Vec<Candidate>,
    pub texts: Vec<Candidate>,
}

pub struct Collector {
    image_selector: Selector,
    paragraph_selector: Selector,
    images: ImageRules,
    min_text_chars: usize,
}

impl Collector {
    pub fn new(
        image_selector: Selector,
        paragraph_selector: Selector,
        images: ImageRules,
        min_text_chars: usize,
    ) -> Self {
        Self {
            image_selector,
            paragraph_selector,
            images,
            min_text_chars,
        }
    }

    /// Walk the area once in depth-first order. A candidate's position is the
    /// number of area descendants (elements, text, comments) preceding it.
    pub fn collect(&self, area: &ContentArea<'_>, page_url: &Url, site_origin: &Url) -> Collected {
        let mut collected = Collected::default();

        for (position, node) in area.element.descendants().skip(1).enumerate() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };

            if self.image_selector.matches(&element) {
                if let Some(url) = self.images.url_of(element, page_url, site_origin) {
                    collected.images.push(Candidate::image(url, position));
                }
            }

            if self.paragraph_selector.matches(&element) {
                let text = dom::raw_text(element);
                let text = text.trim();
                if char_len(text) >= self.min_text_chars {
                    collected.texts.push(Candidate::text(text, position));
                }
            }
        }

        collected
    }
}
