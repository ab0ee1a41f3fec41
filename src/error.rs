//! Error types for the news-fetch layer.
//!
//! Errors never escape the public fetch API: [`crate::service::NewsService`]
//! turns them into fallback data and [`crate::store::NewsStore`] turns them into
//! its `error` slot. They are still typed so logs and the `try_*` service methods
//! can tell a missing API key apart from a flaky network.

use std::fmt;
use thiserror::Error;

/// Upstream news provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    GNews,
    NewsData,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::GNews => f.write_str("GNews"),
            Provider::NewsData => f.write_str("NewsData"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: Provider },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream responded with status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("could not decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("news article not found: {0}")]
    NotFound(String),

    #[error("could not persist `{key}`: {source}")]
    Storage {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl NewsError {
    /// True for failures that may succeed if simply tried again later.
    ///
    /// Configuration problems, lookups of unknown ids and 4xx responses are
    /// not transient; timeouts, connection failures and 5xx responses are.
    pub fn is_transient(&self) -> bool {
        match self {
            NewsError::Transport(_) => true,
            NewsError::Upstream { status, .. } => *status >= 500 || *status == 429,
            NewsError::Io(_) => true,
            NewsError::MissingApiKey { .. }
            | NewsError::Decode(_)
            | NewsError::NotFound(_)
            | NewsError::Storage { .. }
            | NewsError::Config(_) => false,
        }
    }

    pub(crate) fn storage(
        key: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        NewsError::Storage {
            key: key.to_string(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_not_transient() {
        let err = NewsError::MissingApiKey {
            provider: Provider::GNews,
        };
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "GNews API key is not configured");
    }

    #[test]
    fn test_upstream_status_classification() {
        let server_error = NewsError::Upstream {
            status: 503,
            body: String::new(),
        };
        let rate_limited = NewsError::Upstream {
            status: 429,
            body: String::new(),
        };
        let forbidden = NewsError::Upstream {
            status: 403,
            body: "bad key".to_string(),
        };
        assert!(server_error.is_transient());
        assert!(rate_limited.is_transient());
        assert!(!forbidden.is_transient());
    }

    #[test]
    fn test_storage_error_message() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = NewsError::storage("favorites", io);
        assert_eq!(err.to_string(), "could not persist `favorites`: denied");
    }
}
