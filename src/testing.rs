//! In-memory transport fake shared by the unit tests.

use crate::error::NewsError;
use crate::http::HttpTransport;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers GNews-style requests with `gnews_count` articles and NewsData-style
/// requests (any URL containing `newsdata`) with `newsdata_count` results.
pub struct FakeTransport {
    pub gnews_count: usize,
    pub newsdata_count: usize,
    pub fail_with_status: Option<u16>,
    calls: AtomicUsize,
    queries: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeTransport {
    pub fn new(gnews_count: usize, newsdata_count: usize) -> Self {
        Self {
            gnews_count,
            newsdata_count,
            fail_with_status: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::new(0, 0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<Vec<(String, String)>> {
        self.queries.lock().unwrap().clone()
    }
}

pub fn gnews_body(count: usize) -> Value {
    let articles: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "title": format!("GNews story {i}"),
                "description": format!("Description {i}"),
                "content": format!("Content {i}"),
                "url": format!("https://example.com/g/{i}"),
                "image": null,
                "publishedAt": format!("2025-05-06T12:{:02}:00Z", i % 60),
                "source": { "name": "Example Wire" }
            })
        })
        .collect();
    json!({ "totalArticles": count, "articles": articles })
}

pub fn newsdata_body(count: usize) -> Value {
    let results: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "article_id": format!("nd{i}"),
                "title": format!("NewsData story {i}"),
                "description": format!("Business {i}"),
                "link": format!("https://example.com/n/{i}"),
                "source_id": "example_biz",
                "pubDate": "2025-05-06 08:00:00"
            })
        })
        .collect();
    json!({ "status": "success", "totalResults": count, "results": results })
}

impl HttpTransport for FakeTransport {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, NewsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        );
        // suspend once so concurrent callers interleave like real requests
        tokio::task::yield_now().await;
        if let Some(status) = self.fail_with_status {
            return Err(NewsError::Upstream {
                status,
                body: "fake failure".to_string(),
            });
        }
        if url.contains("newsdata") {
            Ok(newsdata_body(self.newsdata_count))
        } else {
            Ok(gnews_body(self.gnews_count))
        }
    }
}
