//! Runtime settings.
//!
//! Settings come from three layers, later ones winning:
//! 1. built-in defaults
//! 2. an optional YAML file (`--config settings.yaml`)
//! 3. API keys from the command line or environment (`GNEWS_API_KEY`,
//!    `NEWSDATA_API_KEY`, also accepted with a `VITE_` prefix)
//!
//! A provider whose key is absent is never called; its queries fail fast and
//! are served the fallback articles.

use crate::error::NewsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_GNEWS_ENDPOINT: &str = "https://gnews.io/api/v4/search";
pub const DEFAULT_NEWSDATA_ENDPOINT: &str = "https://newsdata.io/api/1/news";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gnews_api_key: Option<String>,
    pub newsdata_api_key: Option<String>,
    pub gnews_endpoint: String,
    pub newsdata_endpoint: String,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// How long a cached response stays valid.
    pub cache_ttl_secs: u64,
    pub page_size: usize,
    /// `max` sent to GNews for the interactive queries.
    pub max_results: usize,
    pub language: String,
    pub country: String,
    /// Where favorites and read history are kept.
    pub storage_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gnews_api_key: None,
            newsdata_api_key: None,
            gnews_endpoint: DEFAULT_GNEWS_ENDPOINT.to_string(),
            newsdata_endpoint: DEFAULT_NEWSDATA_ENDPOINT.to_string(),
            request_timeout_secs: 10,
            cache_ttl_secs: 10 * 60,
            page_size: 10,
            max_results: 10,
            language: "zh".to_string(),
            country: "cn".to_string(),
            storage_dir: PathBuf::from(".ai_news"),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file. Missing fields keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, NewsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_yaml_str(&text)?;
        info!("Loaded settings file");
        Ok(settings)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, NewsError> {
        let settings: Settings =
            serde_yaml::from_str(text).map_err(|e| NewsError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Fill in API keys that were not set in the file. Empty strings count as unset.
    pub fn with_api_keys(mut self, gnews: Option<String>, newsdata: Option<String>) -> Self {
        if let Some(key) = non_empty(gnews) {
            self.gnews_api_key = Some(key);
        }
        if let Some(key) = non_empty(newsdata) {
            self.newsdata_api_key = Some(key);
        }
        self.gnews_api_key = non_empty(self.gnews_api_key);
        self.newsdata_api_key = non_empty(self.newsdata_api_key);
        self
    }

    pub fn validate(&self) -> Result<(), NewsError> {
        for endpoint in [&self.gnews_endpoint, &self.newsdata_endpoint] {
            Url::parse(endpoint)
                .map_err(|e| NewsError::Config(format!("bad endpoint `{endpoint}`: {e}")))?;
        }
        if self.page_size == 0 {
            return Err(NewsError::Config("page_size must be at least 1".to_string()));
        }
        if ttl_from_secs(self.cache_ttl_secs).is_none() {
            return Err(NewsError::Config(format!(
                "cache_ttl_secs {} is out of range",
                self.cache_ttl_secs
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Saturates at the largest representable duration; [`Settings::validate`]
    /// rejects such values when loading a file.
    pub fn cache_ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.cache_ttl_secs).unwrap_or(chrono::Duration::MAX)
    }
}

fn ttl_from_secs(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}

/// Read an API key from the environment, accepting the `VITE_`-prefixed name
/// the browser build used.
pub fn api_key_from_env(name: &str) -> Option<String> {
    non_empty(
        std::env::var(name)
            .ok()
            .or_else(|| std::env::var(format!("VITE_{name}")).ok()),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
