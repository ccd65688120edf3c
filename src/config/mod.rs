use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Longest trailing window accepted, roughly a century
pub const MAX_WINDOW_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub listenbrainz: ListenBrainzConfig,
    pub history: HistoryConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ListenBrainzConfig {
    pub base_url: String,
    /// Path template; `{user}` is replaced with the configured username
    pub listens_path: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

// The token stays out of logs and panics.
impl std::fmt::Debug for ListenBrainzConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenBrainzConfig")
            .field("base_url", &self.base_url)
            .field("listens_path", &self.listens_path)
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub window_days: u32,
    pub max_pages: usize,
    pub max_duration_secs: u64,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub top_n: usize,
}

impl ListenBrainzConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.listenbrainz.org";
    pub const DEFAULT_LISTENS_PATH: &'static str = "/1/user/{user}/listens";

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full listens endpoint for the configured user.
    ///
    /// The username is percent-encoded as a single path segment.
    pub fn listens_url(&self) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid ListenBrainz base URL '{}'", self.base_url))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                anyhow::anyhow!("ListenBrainz base URL '{}' cannot carry a path", self.base_url)
            })?;
            segments.pop_if_empty();
            for segment in self.listens_path.split('/').filter(|s| !s.is_empty()) {
                segments.push(&segment.replace("{user}", &self.user));
            }
        }
        Ok(url)
    }
}

impl HistoryConfig {
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 250,
            max_delay_ms: 5_000,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("LISTENSTATS_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "LISTENSTATS_PORT", 8080u16)?;

        let base_url = lookup("LISTENBRAINZ_BASE_URL")
            .unwrap_or_else(|| ListenBrainzConfig::DEFAULT_BASE_URL.to_string());
        let listens_path = lookup("LISTENBRAINZ_LISTENS_PATH")
            .unwrap_or_else(|| ListenBrainzConfig::DEFAULT_LISTENS_PATH.to_string());
        let user = lookup("LISTENBRAINZ_USER")
            .filter(|v| !v.trim().is_empty())
            .context("LISTENBRAINZ_USER must be set")?;
        let token = lookup("LISTENBRAINZ_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .context("LISTENBRAINZ_TOKEN must be set")?;
        let page_size = parse_or(&lookup, "LISTENBRAINZ_PAGE_SIZE", 100u32)?;
        let timeout_secs = parse_or(&lookup, "LISTENBRAINZ_TIMEOUT_SECS", 10u64)?;

        if page_size == 0 {
            anyhow::bail!("LISTENBRAINZ_PAGE_SIZE must be greater than zero");
        }

        let retry_defaults = RetryConfig::default();
        let retry = RetryConfig {
            max_retries: parse_or(&lookup, "FETCH_MAX_RETRIES", retry_defaults.max_retries)?,
            base_delay_ms: parse_or(&lookup, "FETCH_RETRY_BASE_MS", retry_defaults.base_delay_ms)?,
            max_delay_ms: parse_or(&lookup, "FETCH_RETRY_MAX_MS", retry_defaults.max_delay_ms)?,
        };

        let window_days = parse_or(&lookup, "HISTORY_WINDOW_DAYS", 7u32)?;
        if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
            anyhow::bail!("HISTORY_WINDOW_DAYS must be between 1 and {MAX_WINDOW_DAYS}");
        }

        let history = HistoryConfig {
            window_days,
            max_pages: parse_or(&lookup, "HISTORY_MAX_PAGES", 500usize)?,
            max_duration_secs: parse_or(&lookup, "HISTORY_MAX_DURATION_SECS", 60u64)?,
            retry,
        };

        let top_n = parse_or(&lookup, "REPORT_TOP_N", 10usize)?;

        let listenbrainz = ListenBrainzConfig {
            base_url,
            listens_path,
            user,
            token,
            page_size,
            timeout_secs,
        };
        listenbrainz.listens_url()?;

        Ok(Config {
            server: ServerConfig { host, port },
            listenbrainz,
            history,
            report: ReportConfig { top_n },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
