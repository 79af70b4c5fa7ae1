use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{error, info};

use topicscrape::{
    config::Config,
    crawl::CrawlRunner,
    extractor::Extractor,
    fetcher::HttpFetcher,
    links::filter_crawlable,
    table,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    let raw_links = table::read_column(config.input_path(), config.link_column())?;
    let (links, rejected) = filter_crawlable(&raw_links);
    if rejected > 0 {
        info!("Filtered {} non-topic or profile links", rejected);
    }
    info!("Crawling {} links from {}", links.len(), config.input_path().display());

    let extractor = Extractor::with_defaults(config.site_origin().clone())?;
    let fetcher = HttpFetcher::new(&config)?;
    let runner = CrawlRunner::new(config.clone(), extractor, Arc::new(fetcher));

    let shutdown_token = runner.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Received shutdown signal, finishing current link...");
        shutdown_token.cancel();
    });

    let (rows, stats) = runner.run(&links).await;
    table::write_rows(config.output_path(), &rows)?;

    info!(
        "Saved {} rows for {} links ({} without content) to {}",
        rows.len(),
        stats.processed,
        stats.empty,
        config.output_path().display()
    );
    Ok(())
}
