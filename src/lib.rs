pub mod config;
pub mod crawl;
pub mod extractor;
pub mod fetcher;
pub mod links;
pub mod table;
