//! Response cache with a fixed time-to-live.
//!
//! Entries are keyed by a composite string (endpoint + serialized query
//! parameters) and stamped with the time they were stored. Nothing is ever
//! evicted: a stale entry just stops being [`ResponseCache::is_valid`] and is
//! overwritten by the next successful fetch for the same key.

use crate::clock::Clock;
use crate::models::Article;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::trace;

/// What a cache entry holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedPayload {
    List(Vec<Article>),
    Single(Article),
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: CachedPayload,
    pub timestamp: DateTime<Utc>,
}

pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Build the cache key for `category` and its query parameters.
///
/// Parameters are serialized as a JSON object with sorted keys, so the same
/// parameters always give the same key.
pub fn compute_key(category: &str, params: &BTreeMap<&str, String>) -> String {
    let params = serde_json::to_string(params).unwrap_or_default();
    format!("{category}_{params}")
}

impl ResponseCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    /// True iff an entry exists for `key` and is younger than the TTL.
    pub fn is_valid(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) => self.clock.now() - entry.timestamp < self.ttl,
            None => false,
        }
    }

    /// The stored payload, stale or not.
    pub fn get(&self, key: &str) -> Option<&CachedPayload> {
        self.entries.get(key).map(|entry| &entry.data)
    }

    /// The stored payload if it is still valid.
    pub fn get_fresh(&self, key: &str) -> Option<&CachedPayload> {
        if self.is_valid(key) { self.get(key) } else { None }
    }

    pub fn set(&mut self, key: impl Into<String>, data: CachedPayload) {
        let key = key.into();
        trace!(%key, "cache set");
        self.entries.insert(
            key,
            CacheEntry {
                data,
                timestamp: self.clock.now(),
            },
        );
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{Category, sample_article};

    fn cache_with_clock() -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = ResponseCache::new(Duration::minutes(10), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_compute_key_is_deterministic() {
        let a = BTreeMap::from([("query", "AI".to_string()), ("maxResults", "10".to_string())]);
        let b = BTreeMap::from([("maxResults", "10".to_string()), ("query", "AI".to_string())]);
        assert_eq!(compute_key("gnews", &a), compute_key("gnews", &b));
        assert_eq!(
            compute_key("gnews", &a),
            r#"gnews_{"maxResults":"10","query":"AI"}"#
        );
    }

    #[test]
    fn test_compute_key_distinguishes_params() {
        let page1 = BTreeMap::from([("page", "1".to_string())]);
        let page2 = BTreeMap::from([("page", "2".to_string())]);
        assert_ne!(compute_key("latest", &page1), compute_key("latest", &page2));
        assert_ne!(compute_key("latest", &page1), compute_key("search", &page1));
    }

    #[test]
    fn test_entry_valid_until_ttl_elapses() {
        let (mut cache, clock) = cache_with_clock();
        assert!(!cache.is_valid("k"));

        cache.set("k", CachedPayload::List(vec![]));
        assert!(cache.is_valid("k"));

        clock.advance(Duration::minutes(9) + Duration::seconds(59));
        assert!(cache.is_valid("k"));

        clock.advance(Duration::seconds(1));
        assert!(!cache.is_valid("k"));
        assert!(cache.get_fresh("k").is_none());
        // stale entries are kept until overwritten
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn test_set_overwrites_and_restamps() {
        let (mut cache, clock) = cache_with_clock();
        cache.set("k", CachedPayload::List(vec![]));
        clock.advance(Duration::minutes(11));
        assert!(!cache.is_valid("k"));

        let article = sample_article("x", Category::Latest);
        cache.set("k", CachedPayload::Single(article.clone()));
        assert!(cache.is_valid("k"));
        assert_eq!(cache.get("k"), Some(&CachedPayload::Single(article)));
        assert_eq!(cache.len(), 1);
    }
}
