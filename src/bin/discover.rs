//! Collect topic links from a listing page into the crawl's input file.
//!
//! Usage: `discover <listing-url>`; the output path and column name come from
//! the same environment as the crawler.

use anyhow::{Context, Result};
use url::Url;

use topicscrape::{config::Config, fetcher::HttpFetcher, links, table};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let listing = std::env::args()
        .nth(1)
        .context("usage: discover <listing-url>")?;
    let listing = Url::parse(&listing).with_context(|| format!("invalid listing url {listing:?}"))?;

    let fetcher = HttpFetcher::new(&config)?;
    let found = links::discover(&fetcher, &listing, config.site_origin()).await;
    if found.is_empty() {
        anyhow::bail!("no links found on {listing}");
    }

    let found: Vec<String> = found.into_iter().map(String::from).collect();
    table::write_links(config.input_path(), config.link_column(), &found)?;
    Ok(())
}
