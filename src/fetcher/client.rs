use crate::config::{self, Config};
use crate::fetcher::{errors::FetchError, pipeline::process_response, types::PageResponse};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode, header};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can hand the crawler a page for a URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<PageResponse, FetchError>;
}

/// The production [`PageSource`]: one GET per call, fixed headers, bounded
/// timeout, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(config::ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_str(config.accept_language())
                .map_err(|e| FetchError::Unknown(format!("accept-language header: {e}")))?,
        );

        let client = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT.min(config.request_timeout()))
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()
            .map_err(FetchError::from_reqwest_error)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<PageResponse, FetchError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        // Anything but a plain 200 counts as a page without content.
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }

        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !is_textual(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        // Content-Length may be missing or wrong.
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        debug!(final_url = %final_url, bytes = body_bytes.len(), "page fetched");
        Ok(process_response(final_url, &body_bytes, &content_type))
    }
}

/// Any text or markup body is parsed; mislabelled pages are common.
/// Images, media and other binary payloads are refused.
fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime.contains("html") || mime.ends_with("xml")
}

/// Convenience wrapper for one-off fetches outside a crawl.
pub async fn fetch(config: &Config, url: &str) -> Result<PageResponse, FetchError> {
    let url = Url::parse(url)?;
    HttpFetcher::new(config)?.fetch(&url).await
}
