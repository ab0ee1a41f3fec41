//! HTTP client wrapper for the news provider APIs.
//!
//! [`HttpTransport`] is the seam between the fetch layer and the network:
//! [`ReqwestTransport`] is the real implementation, tests plug in in-memory
//! fakes. Each call is a single GET with a fixed timeout. Failures go straight
//! back to the caller; there is no retry or backoff at this layer.

use crate::error::NewsError;
use crate::utils::truncate_for_log;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Issues GET requests and decodes JSON bodies.
pub trait HttpTransport {
    /// GET `url` with the given query parameters and return the decoded body.
    ///
    /// Non-2xx responses are reported as [`NewsError::Upstream`].
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, NewsError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, NewsError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ai_news_site/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, NewsError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = dt.as_millis() as u64,
                body = %truncate_for_log(&body, 300),
                "Upstream returned an error status"
            );
            return Err(NewsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = dt.as_millis() as u64,
            "GET succeeded"
        );
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "AI".into()))
            .with_status(403)
            .with_body("{\"errors\":[\"bad key\"]}")
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(10)).unwrap();
        let url = format!("{}/search", server.url());
        let err = transport
            .get_json(&url, &[("q", "AI".to_string())])
            .await
            .unwrap_err();

        mock.assert_async().await;
        match err {
            NewsError::Upstream { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_json_body_is_decoded() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/news")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","results":[]}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(10)).unwrap();
        let body = transport
            .get_json(&format!("{}/news", server.url()), &[])
            .await
            .unwrap();
        assert_eq!(body["status"], "success");
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/news")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(10)).unwrap();
        let err = transport
            .get_json(&format!("{}/news", server.url()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, NewsError::Decode(_)));
    }
}
