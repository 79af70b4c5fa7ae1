use url::Url;

use crate::extractor::model::{Candidate, ContentItem, ContentKind, char_len, normalize_whitespace};

/// Resolve an image source to an absolute http(s) URL.
///
/// `//host/x` takes `https:`; `/x` resolves against the site origin; other
/// relative forms resolve against the page's own URL. Sources that end up
/// with any other scheme (`data:`, `javascript:`) are dropped.
pub fn resolve_image_url(raw: &str, page_url: &Url, site_origin: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let resolved = if let Some(rest) = raw.strip_prefix("//") {
        Url::parse(&format!("https://{rest}")).ok()?
    } else if raw.starts_with('/') {
        site_origin.join(raw).ok()?
    } else if has_http_scheme(raw) {
        Url::parse(raw).ok()?
    } else {
        page_url.join(raw).ok()?
    };

    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

fn has_http_scheme(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether the URL names page chrome rather than post content.
pub fn is_decorative(url: &str, denylist: &[String]) -> bool {
    let lower = url.to_lowercase();
    denylist.iter().any(|needle| lower.contains(needle.as_str()))
}

/// Clean text, drop what falls under the length floor, and number the rest
/// densely from 1 in the order given.
pub fn normalize(candidates: Vec<Candidate>, min_text_chars: usize) -> Vec<ContentItem> {
    candidates
        .into_iter()
        .filter_map(|candidate| match candidate.kind {
            ContentKind::Image => Some((ContentKind::Image, candidate.raw_value)),
            ContentKind::Text => {
                let cleaned = normalize_whitespace(&candidate.raw_value);
                (char_len(&cleaned) >= min_text_chars).then_some((ContentKind::Text, cleaned))
            }
        })
        .zip(1u32..)
        .map(|((kind, value), order)| ContentItem { kind, value, order })
        .collect()
}
