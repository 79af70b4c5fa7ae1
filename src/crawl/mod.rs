//! Sequential fetch-then-extract loop over a list of links.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::extractor::{ContentItem, ContentKind, ExtractError, Extraction, Extractor};
use crate::fetcher::PageSource;
use crate::table::{ResultRow, RowKind};

/// Items extracted for one source link. Empty items mean the link produced
/// nothing, for whatever reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub source_url: String,
    pub items: Vec<ContentItem>,
}

impl ExtractionResult {
    pub fn empty(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            items: Vec::new(),
        }
    }

    /// One row per item, or a single sentinel row when there are none.
    pub fn into_rows(self) -> Vec<ResultRow> {
        if self.items.is_empty() {
            return vec![ResultRow::no_content(self.source_url)];
        }

        let source_url = self.source_url;
        self.items
            .into_iter()
            .map(|item| ResultRow {
                source_url: source_url.clone(),
                order: item.order,
                kind: match item.kind {
                    ContentKind::Text => RowKind::Text,
                    ContentKind::Image => RowKind::Image,
                },
                value: item.value,
            })
            .collect()
    }
}

/// Totals of a finished (or cancelled) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub processed: usize,
    pub empty: usize,
    pub cancelled: bool,
}

pub struct CrawlRunner {
    config: Config,
    extractor: Extractor,
    source: Arc<dyn PageSource>,
    shutdown_token: CancellationToken,
}

impl CrawlRunner {
    pub fn new(config: Config, extractor: Extractor, source: Arc<dyn PageSource>) -> Self {
        Self {
            config,
            extractor,
            source,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Token that stops the run before its next link when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Crawl `links` one at a time, pausing between requests. Every link
    /// processed contributes at least one row.
    pub async fn run(&self, links: &[Url]) -> (Vec<ResultRow>, CrawlStats) {
        let run_id = Uuid::new_v4();
        let span = info_span!("crawl", run_id = %run_id, links = links.len());

        async move {
            info!(
                "Starting crawl - delay: {}ms, timeout: {}s",
                self.config.request_delay().as_millis(),
                self.config.request_timeout().as_secs()
            );

            let mut rows = Vec::new();
            let mut stats = CrawlStats::default();

            for (idx, link) in links.iter().enumerate() {
                if self.shutdown_token.is_cancelled() {
                    stats.cancelled = true;
                    break;
                }

                info!("[{}/{}] {}", idx + 1, links.len(), link);
                let result = self.process(link).await;
                stats.processed += 1;
                if result.items.is_empty() {
                    stats.empty += 1;
                }
                rows.extend(result.into_rows());

                if idx + 1 < links.len() {
                    tokio::select! {
                        _ = sleep(self.config.request_delay()) => {}
                        _ = self.shutdown_token.cancelled() => {
                            stats.cancelled = true;
                            break;
                        }
                    }
                }
            }

            if stats.cancelled {
                warn!(processed = stats.processed, "crawl cancelled");
            }
            info!(
                processed = stats.processed,
                empty = stats.empty,
                rows = rows.len(),
                "crawl finished"
            );
            (rows, stats)
        }
        .instrument(span)
        .await
    }

    /// Fetch and extract one link. Never fails: any problem is logged and the
    /// result comes back empty.
    #[instrument(skip_all, fields(url = %link))]
    pub async fn process(&self, link: &Url) -> ExtractionResult {
        let page = match self.source.fetch(link).await {
            Ok(page) => page,
            Err(e) if e.is_transport() => {
                warn!(error = %e, "link unreachable");
                return ExtractionResult::empty(link.as_str());
            }
            Err(e) => {
                info!(error = %e, "page rejected");
                return ExtractionResult::empty(link.as_str());
            }
        };
        debug!(charset = ?page.charset, "page decoded");

        match self.extract_guarded(&page.body_utf8, &page.url_final) {
            Ok(extraction) => {
                info!(
                    texts = extraction.text_count(),
                    images = extraction.image_count(),
                    tier = %extraction.tier,
                    "extracted"
                );
                ExtractionResult {
                    source_url: link.to_string(),
                    items: extraction.items,
                }
            }
            Err(e) => {
                warn!(error = %e, "extraction failed");
                ExtractionResult::empty(link.as_str())
            }
        }
    }

    fn extract_guarded(&self, html: &str, page_url: &Url) -> Result<Extraction, ExtractError> {
        guard_panics(|| self.extractor.extract(html, page_url))
    }
}

/// Run `f`, turning a panic inside it into [`ExtractError::ParseAnomaly`].
fn guard_panics<T>(f: impl FnOnce() -> Result<T, ExtractError>) -> Result<T, ExtractError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic during traversal".to_string());
        debug!(reason = %reason, "extractor panicked");
        Err(ExtractError::ParseAnomaly(reason))
    })
}
