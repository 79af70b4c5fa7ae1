use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::extractor::dom;
use crate::extractor::model::{SelectionStrategy, char_len};

/// The subtree judged to hold the post body.
#[derive(Debug, Clone, Copy)]
pub struct ContentArea<'a> {
    pub element: ElementRef<'a>,
    pub strategy: SelectionStrategy,
}

pub struct ContainerSelector {
    signatures: Vec<Selector>,
    fallback: Selector,
    class_pattern: Regex,
}

impl ContainerSelector {
    pub fn new(signatures: Vec<Selector>, fallback: Selector, class_pattern: Regex) -> Self {
        Self {
            signatures,
            fallback,
            class_pattern,
        }
    }

    /// Known signatures in priority order, then the loose class scan.
    pub fn select<'a>(&self, document: &'a Html) -> Option<ContentArea<'a>> {
        self.by_signature(document)
            .or_else(|| self.by_largest_text(document))
    }

    fn by_signature<'a>(&self, document: &'a Html) -> Option<ContentArea<'a>> {
        self.signatures
            .iter()
            .enumerate()
            .find_map(|(index, selector)| {
                document.select(selector).next().map(|element| ContentArea {
                    element,
                    strategy: SelectionStrategy::Signature(index),
                })
            })
    }

    fn by_largest_text<'a>(&self, document: &'a Html) -> Option<ContentArea<'a>> {
        let mut best: Option<(ElementRef<'a>, usize)> = None;

        for element in document.select(&self.fallback) {
            let Some(class) = element.value().attr("class") else {
                continue;
            };
            if !self.class_pattern.is_match(class) {
                continue;
            }

            let text_len = char_len(&dom::raw_text(element));
            // Strictly greater keeps the earliest element on ties.
            if best.is_none_or(|(_, best_len)| text_len > best_len) {
                best = Some((element, text_len));
            }
        }

        best.map(|(element, _)| ContentArea {
            element,
            strategy: SelectionStrategy::LargestText,
        })
    }
}
