//! Read one HTML document from stdin and print its extraction as JSON.
//!
//! Usage: `extract_stdin <page-url> < page.html`. Handy for checking what
//! the crawler would record for a saved page.

use std::io::{self, Read};

use anyhow::{Context, Result};
use serde::Serialize;
use url::Url;

use topicscrape::config::Config;
use topicscrape::extractor::{ContentItem, ExtractionTier, Extractor, SelectionStrategy};

#[derive(Serialize)]
struct Output {
    url: String,
    strategy: Option<SelectionStrategy>,
    tier: Option<ExtractionTier>,
    items: Vec<ContentItem>,
    error: Option<String>,
}

fn main() -> Result<()> {
    let page_url = std::env::args()
        .nth(1)
        .context("usage: extract_stdin <page-url> < page.html")?;
    let page_url = Url::parse(&page_url).context("invalid page url")?;

    let mut html = String::new();
    io::stdin()
        .read_to_string(&mut html)
        .context("failed to read stdin")?;

    let config = Config::from_env()?;
    let extractor = Extractor::with_defaults(config.site_origin().clone())?;

    let output = match extractor.extract(&html, &page_url) {
        Ok(extraction) => Output {
            url: page_url.to_string(),
            strategy: Some(extraction.strategy),
            tier: Some(extraction.tier),
            items: extraction.items,
            error: None,
        },
        Err(e) => Output {
            url: page_url.to_string(),
            strategy: None,
            tier: None,
            items: Vec::new(),
            error: Some(e.to_string()),
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
