use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Settings for the resilient request client. Built once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    /// Scheme and authority (plus optional path prefix), no trailing slash.
    pub base_url: String,
    /// Upper bound on a single attempt.
    pub timeout: Duration,
    /// Additional attempts after the first one for transient failures.
    pub max_retries: u32,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RequestConfig {
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self> {
        if timeout.is_zero() {
            bail!("Request timeout must be greater than zero");
        }
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .with_context(|| format!("'{base_url}' is not a valid base URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Base URL '{base_url}' must use http or https");
        }
        Ok(Self {
            base_url,
            timeout,
            max_retries,
        })
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub request: RequestConfig,
    /// `None` means no data directory could be determined; the in-memory store is used.
    pub storage_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let base_url =
            optional_env("OUTREACH_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_ms = parse_env("OUTREACH_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        let max_retries = parse_env("OUTREACH_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;

        Ok(Config {
            request: RequestConfig::new(&base_url, Duration::from_millis(timeout_ms), max_retries)?,
            storage_path: optional_env("OUTREACH_STORAGE_PATH")
                .map(PathBuf::from)
                .or_else(default_storage_path),
            port: parse_env("PORT", 8000u16).context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn default_storage_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("outreach").join("storage.json"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
