//! Topic links from a forum listing page, and the filter applied to any link
//! before it is crawled.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::fetcher::PageSource;

static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table td").unwrap());
static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.title").unwrap());
static ANY_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Path segment of personal profile pages.
const PROFILE_SEGMENT: &str = "people";

/// Whether a URL points at a user's profile rather than a topic.
pub fn is_profile_link(url: &Url) -> bool {
    url.path_segments()
        .is_some_and(|mut segments| segments.any(|segment| segment == PROFILE_SEGMENT))
}

/// Parse a raw cell value into a crawlable link: an absolute http(s) URL that
/// is not a profile page.
pub fn crawlable(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || is_profile_link(&url) {
        return None;
    }
    Some(url)
}

/// Split raw values into crawlable links and a count of the rejected ones.
pub fn filter_crawlable<I, S>(raw: I) -> (Vec<Url>, usize)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut rejected = 0;
    let links = raw
        .into_iter()
        .filter_map(|value| {
            let link = crawlable(value.as_ref());
            if link.is_none() {
                rejected += 1;
            }
            link
        })
        .collect();
    (links, rejected)
}

/// Topic links in a listing page's tables, first occurrence order.
///
/// Each table cell contributes its `a.title` link, or failing that its first
/// link. Hrefs resolve against the site origin.
pub fn discover_links(html: &str, site_origin: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for cell in document.select(&CELL) {
        let anchor = cell
            .select(&TITLE_LINK)
            .next()
            .or_else(|| cell.select(&ANY_LINK).next());
        let Some(href) = anchor.and_then(|a| a.value().attr("href")) else {
            continue;
        };
        if href.trim().is_empty() {
            continue;
        }

        let Ok(url) = site_origin.join(href.trim()) else {
            debug!(href, "unresolvable href");
            continue;
        };
        if is_profile_link(&url) || !seen.insert(url.clone()) {
            continue;
        }

        debug!(url = %url, "found link");
        links.push(url);
    }

    links
}

/// Fetch a listing page and return its topic links. A failed fetch yields no
/// links.
#[instrument(skip_all, fields(listing = %listing_url))]
pub async fn discover(source: &dyn PageSource, listing_url: &Url, site_origin: &Url) -> Vec<Url> {
    match source.fetch(listing_url).await {
        Ok(page) => {
            let links = discover_links(&page.body_utf8, site_origin);
            info!(count = links.len(), "discovered links");
            links
        }
        Err(e) => {
            warn!(error = %e, "listing fetch failed");
            Vec::new()
        }
    }
}
