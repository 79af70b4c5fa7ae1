//! Configuration handling for a crawl run.
//!
//! Everything the batch loop used to treat as process-wide defaults (request
//! headers, timeout, pacing delay, file locations) lives here and is handed to
//! the runner explicitly. `Config::from_env` reads overrides from the
//! environment and falls back to the values observed against the forum.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

/// Environment variable names.
pub const ENV_INPUT: &str = "TOPICSCRAPE_INPUT";
pub const ENV_OUTPUT: &str = "TOPICSCRAPE_OUTPUT";
pub const ENV_LINK_COLUMN: &str = "TOPICSCRAPE_LINK_COLUMN";
pub const ENV_SITE_ORIGIN: &str = "TOPICSCRAPE_SITE_ORIGIN";
pub const ENV_DELAY_MS: &str = "TOPICSCRAPE_DELAY_MS";
pub const ENV_TIMEOUT_SECS: &str = "TOPICSCRAPE_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "TOPICSCRAPE_USER_AGENT";
pub const ENV_ACCEPT_LANGUAGE: &str = "TOPICSCRAPE_ACCEPT_LANGUAGE";

const DEFAULT_INPUT: &str = "links.csv";
const DEFAULT_OUTPUT: &str = "content.csv";
const DEFAULT_LINK_COLUMN: &str = "链接";
const DEFAULT_SITE_ORIGIN: &str = "https://www.douban.com";
const DEFAULT_DELAY_MS: u64 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Accept header sent with every request. Not configurable: the forum only
/// ever serves HTML to us.
pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Runtime configuration for discovery and crawling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    input_path: PathBuf,
    output_path: PathBuf,
    link_column: String,
    site_origin: Url,
    request_delay: Duration,
    request_timeout: Duration,
    user_agent: String,
    accept_language: String,
}

impl Config {
    /// Create a config with explicit file locations and default network settings.
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let site_origin = match env::var(ENV_SITE_ORIGIN) {
            Ok(raw) => parse_origin(&raw)?,
            Err(_) => defaults.site_origin,
        };

        Ok(Self {
            input_path: env::var(ENV_INPUT)
                .map(PathBuf::from)
                .unwrap_or(defaults.input_path),
            output_path: env::var(ENV_OUTPUT)
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            link_column: env::var(ENV_LINK_COLUMN).unwrap_or(defaults.link_column),
            site_origin,
            request_delay: Duration::from_millis(parse_u64(ENV_DELAY_MS, DEFAULT_DELAY_MS)?),
            request_timeout: Duration::from_secs(parse_u64(
                ENV_TIMEOUT_SECS,
                DEFAULT_TIMEOUT_SECS,
            )?),
            user_agent: env::var(ENV_USER_AGENT).unwrap_or(defaults.user_agent),
            accept_language: env::var(ENV_ACCEPT_LANGUAGE).unwrap_or(defaults.accept_language),
        })
    }

    pub fn with_site_origin(mut self, origin: Url) -> Self {
        self.site_origin = origin;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_link_column(mut self, column: impl Into<String>) -> Self {
        self.link_column = column.into();
        self
    }

    /// CSV file holding the links to crawl.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }
    /// CSV file the result rows are written to.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
    /// Header of the input column holding the URLs.
    pub fn link_column(&self) -> &str {
        &self.link_column
    }
    /// Origin that root-relative links and image sources resolve against.
    pub fn site_origin(&self) -> &Url {
        &self.site_origin
    }
    /// Pause between two consecutive requests.
    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
    pub fn accept_language(&self) -> &str {
        &self.accept_language
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            link_column: DEFAULT_LINK_COLUMN.to_string(),
            site_origin: default_origin(),
            request_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

/// The built-in site origin.
pub fn default_origin() -> Url {
    Url::parse(DEFAULT_SITE_ORIGIN).unwrap_or_else(|_| unreachable!("constant origin parses"))
}

fn parse_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: key,
            reason: format!("expected a non-negative integer, got {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_origin(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        field: ENV_SITE_ORIGIN,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: ENV_SITE_ORIGIN,
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-manipulating tests must not interleave.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ALL_KEYS: [&str; 8] = [
        ENV_INPUT,
        ENV_OUTPUT,
        ENV_LINK_COLUMN,
        ENV_SITE_ORIGIN,
        ENV_DELAY_MS,
        ENV_TIMEOUT_SECS,
        ENV_USER_AGENT,
        ENV_ACCEPT_LANGUAGE,
    ];

    fn clear_env() {
        for key in ALL_KEYS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.input_path(), Path::new(DEFAULT_INPUT));
        assert_eq!(cfg.output_path(), Path::new(DEFAULT_OUTPUT));
        assert_eq!(cfg.link_column(), "链接");
        assert_eq!(cfg.site_origin().as_str(), "https://www.douban.com/");
        assert_eq!(cfg.request_delay(), Duration::from_secs(1));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(15));
        assert!(cfg.user_agent().starts_with("Mozilla/5.0"));
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_INPUT, "/tmp/in.csv");
            env::set_var(ENV_LINK_COLUMN, "url");
            env::set_var(ENV_SITE_ORIGIN, "https://forum.example.org");
            env::set_var(ENV_DELAY_MS, "250");
            env::set_var(ENV_TIMEOUT_SECS, "3");
        }
        let cfg = Config::from_env().unwrap();
        clear_env();
        assert_eq!(cfg.input_path(), Path::new("/tmp/in.csv"));
        assert_eq!(cfg.link_column(), "url");
        assert_eq!(cfg.site_origin().host_str(), Some("forum.example.org"));
        assert_eq!(cfg.request_delay(), Duration::from_millis(250));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn rejects_unparsable_delay() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_DELAY_MS, "soon");
        }
        let err = Config::from_env().unwrap_err();
        clear_env();
        assert!(err.to_string().contains(ENV_DELAY_MS));
    }

    #[test]
    fn rejects_non_http_origin() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_SITE_ORIGIN, "ftp://files.example.org");
        }
        let result = Config::from_env();
        clear_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: ENV_SITE_ORIGIN,
                ..
            })
        ));
    }
}
