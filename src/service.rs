//! News-fetch module.
//!
//! [`NewsService`] composes an [`HttpTransport`] and a [`ResponseCache`] into
//! category-oriented queries:
//!
//! | Operation | Provider | Query |
//! |-----------|----------|-------|
//! | [`NewsService::get_latest_news`] | GNews | [`LATEST_QUERY`] |
//! | [`NewsService::get_news_by_category`] `ai-tech` | GNews | [`AI_TECH_QUERY`] |
//! | [`NewsService::get_news_by_category`] `industry` | NewsData (`business`) | [`INDUSTRY_QUERY`] |
//! | [`NewsService::search_news`] | GNews | user query |
//! | [`NewsService::get_news_detail`] | none, cache scan only | |
//!
//! Each paged query checks its own cache key first, then fetches the full
//! provider result (itself cached), slices out the requested page and caches
//! the slice.
//!
//! # Failure handling
//!
//! The plain methods never fail. A missing API key, a transport error or an
//! upstream error is logged and answered with [`NewsService::fallback_news`],
//! which is never cached so the next call tries the provider again. Callers
//! that need to tell those cases apart use the `try_*` variants.

use crate::cache::{CachedPayload, ResponseCache, compute_key};
use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::error::{NewsError, Provider};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::models::{Article, Category};
use crate::providers::{PLACEHOLDER_IMAGE, gnews, newsdata};
use crate::utils::paginate;
use chrono::Duration;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, instrument, warn};

pub const LATEST_QUERY: &str = "AI OR artificial intelligence OR ChatGPT";
pub const AI_TECH_QUERY: &str = "ChatGPT OR GPT OR machine learning OR deep learning";
pub const INDUSTRY_QUERY: &str = "artificial intelligence AI";
/// NewsData's own category used for industry news.
pub const INDUSTRY_PROVIDER_CATEGORY: &str = "business";

const GNEWS_KEY: &str = "gnews";
const NEWSDATA_KEY: &str = "newsdata";

pub struct NewsService<T = ReqwestTransport> {
    transport: T,
    settings: Settings,
    cache: Mutex<ResponseCache>,
    clock: Arc<dyn Clock>,
}

impl<T> std::fmt::Debug for NewsService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsService")
            .field("gnews_endpoint", &self.settings.gnews_endpoint)
            .field("newsdata_endpoint", &self.settings.newsdata_endpoint)
            .field("cache", &self.cache)
            .finish()
    }
}

impl NewsService<ReqwestTransport> {
    /// Build a service that talks to the real providers.
    pub fn from_settings(settings: Settings) -> Result<Self, NewsError> {
        let transport = ReqwestTransport::new(settings.request_timeout())?;
        Ok(Self::new(transport, settings, Arc::new(SystemClock)))
    }
}

impl<T: HttpTransport> NewsService<T> {
    pub fn new(transport: T, settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let cache = ResponseCache::new(settings.cache_ttl(), clock.clone());
        Self {
            transport,
            settings,
            cache: Mutex::new(cache),
            clock,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    fn cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cached_list(&self, key: &str) -> Option<Vec<Article>> {
        match self.cache().get_fresh(key) {
            Some(CachedPayload::List(items)) => Some(items.clone()),
            _ => None,
        }
    }

    /// Search GNews for `query`; articles are tagged with `category`.
    #[instrument(level = "info", skip(self))]
    pub async fn try_fetch_gnews(
        &self,
        query: &str,
        max_results: usize,
        category: Category,
    ) -> Result<Vec<Article>, NewsError> {
        let key = compute_key(
            GNEWS_KEY,
            &BTreeMap::from([
                ("query", query.to_string()),
                ("maxResults", max_results.to_string()),
            ]),
        );
        if let Some(articles) = self.cached_list(&key) {
            debug!(count = articles.len(), "GNews cache hit");
            return Ok(articles);
        }

        let api_key = self
            .settings
            .gnews_api_key
            .as_deref()
            .ok_or(NewsError::MissingApiKey {
                provider: Provider::GNews,
            })?;
        let params = gnews::query_params(
            query,
            max_results,
            &self.settings.language,
            &self.settings.country,
            api_key,
        );
        let body = self
            .transport
            .get_json(&self.settings.gnews_endpoint, &params)
            .await?;
        let articles = gnews::map_articles(gnews::parse_response(body)?, category);

        info!(count = articles.len(), "Fetched GNews articles");
        self.cache().set(key, CachedPayload::List(articles.clone()));
        Ok(articles)
    }

    /// Like [`Self::try_fetch_gnews`], answering failures with fallback articles.
    pub async fn fetch_gnews(&self, query: &str, max_results: usize, category: Category) -> Vec<Article> {
        match self.try_fetch_gnews(query, max_results, category).await {
            Ok(articles) => articles,
            Err(e) => self.fallback_after(Provider::GNews, &e),
        }
    }

    /// Fetch NewsData articles in its `provider_category` matching `query`.
    #[instrument(level = "info", skip(self))]
    pub async fn try_fetch_newsdata(
        &self,
        provider_category: &str,
        query: &str,
        category: Category,
    ) -> Result<Vec<Article>, NewsError> {
        let key = compute_key(
            NEWSDATA_KEY,
            &BTreeMap::from([
                ("category", provider_category.to_string()),
                ("query", query.to_string()),
            ]),
        );
        if let Some(articles) = self.cached_list(&key) {
            debug!(count = articles.len(), "NewsData cache hit");
            return Ok(articles);
        }

        let api_key = self
            .settings
            .newsdata_api_key
            .as_deref()
            .ok_or(NewsError::MissingApiKey {
                provider: Provider::NewsData,
            })?;
        let params = newsdata::query_params(provider_category, query, &self.settings.language, api_key);
        let body = self
            .transport
            .get_json(&self.settings.newsdata_endpoint, &params)
            .await?;
        let articles = newsdata::map_articles(newsdata::parse_response(body)?, category);

        info!(count = articles.len(), "Fetched NewsData articles");
        self.cache().set(key, CachedPayload::List(articles.clone()));
        Ok(articles)
    }

    pub async fn fetch_newsdata(&self, provider_category: &str, query: &str, category: Category) -> Vec<Article> {
        match self.try_fetch_newsdata(provider_category, query, category).await {
            Ok(articles) => articles,
            Err(e) => self.fallback_after(Provider::NewsData, &e),
        }
    }

    /// The full, unpaginated provider result for a category.
    pub async fn try_fetch_category(&self, category: Category) -> Result<Vec<Article>, NewsError> {
        let max = self.settings.max_results;
        match category {
            Category::Latest => self.try_fetch_gnews(LATEST_QUERY, max, category).await,
            Category::AiTech => self.try_fetch_gnews(AI_TECH_QUERY, max, category).await,
            Category::Industry => {
                self.try_fetch_newsdata(INDUSTRY_PROVIDER_CATEGORY, INDUSTRY_QUERY, category)
                    .await
            }
        }
    }

    fn provider_for(category: Category) -> Provider {
        match category {
            Category::Industry => Provider::NewsData,
            Category::Latest | Category::AiTech => Provider::GNews,
        }
    }

    pub async fn try_get_latest_news(&self, page: usize, page_size: usize) -> Result<Vec<Article>, NewsError> {
        let key = compute_key("latest", &page_params(page, page_size));
        if let Some(cached) = self.cached_list(&key) {
            return Ok(cached);
        }
        let all = self.try_fetch_category(Category::Latest).await?;
        Ok(self.store_page(key, &all, page, page_size))
    }

    /// One page of the latest AI news.
    #[instrument(level = "info", skip(self))]
    pub async fn get_latest_news(&self, page: usize, page_size: usize) -> Vec<Article> {
        match self.try_get_latest_news(page, page_size).await {
            Ok(articles) => articles,
            Err(e) => paginate(&self.fallback_after(Provider::GNews, &e), page, page_size),
        }
    }

    pub async fn try_get_news_by_category(
        &self,
        category: Category,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Article>, NewsError> {
        let mut params = page_params(page, page_size);
        params.insert("category", category.to_string());
        let key = compute_key("category", &params);
        if let Some(cached) = self.cached_list(&key) {
            return Ok(cached);
        }
        let all = self.try_fetch_category(category).await?;
        Ok(self.store_page(key, &all, page, page_size))
    }

    /// One page of a category.
    #[instrument(level = "info", skip(self))]
    pub async fn get_news_by_category(&self, category: Category, page: usize, page_size: usize) -> Vec<Article> {
        match self.try_get_news_by_category(category, page, page_size).await {
            Ok(articles) => articles,
            Err(e) => paginate(
                &self.fallback_after(Self::provider_for(category), &e),
                page,
                page_size,
            ),
        }
    }

    pub async fn try_search_news(&self, query: &str, page: usize, page_size: usize) -> Result<Vec<Article>, NewsError> {
        let mut params = page_params(page, page_size);
        params.insert("query", query.to_string());
        let key = compute_key("search", &params);
        if let Some(cached) = self.cached_list(&key) {
            return Ok(cached);
        }
        let all = self
            .try_fetch_gnews(query, self.settings.max_results, Category::Latest)
            .await?;
        Ok(self.store_page(key, &all, page, page_size))
    }

    /// One page of GNews results for a free-text query.
    #[instrument(level = "info", skip(self))]
    pub async fn search_news(&self, query: &str, page: usize, page_size: usize) -> Vec<Article> {
        match self.try_search_news(query, page, page_size).await {
            Ok(articles) => articles,
            Err(e) => paginate(&self.fallback_after(Provider::GNews, &e), page, page_size),
        }
    }

    fn store_page(&self, key: String, all: &[Article], page: usize, page_size: usize) -> Vec<Article> {
        let slice = paginate(all, page, page_size);
        debug!(total = all.len(), page, page_size, returned = slice.len(), "Paginated");
        self.cache().set(key, CachedPayload::List(slice.clone()));
        slice
    }

    /// Look an article up by id among everything fetched from the providers so far.
    ///
    /// There is no single-article endpoint: an id whose batch was never
    /// fetched in this process cannot be resolved.
    pub fn try_get_news_detail(&self, id: &str) -> Result<Article, NewsError> {
        let detail_key = compute_key("detail", &BTreeMap::from([("id", id.to_string())]));
        let mut cache = self.cache();

        if let Some(CachedPayload::Single(article)) = cache.get_fresh(&detail_key) {
            return Ok(article.clone());
        }

        let found = cache
            .entries()
            .filter(|(key, _)| is_provider_key(key))
            .find_map(|(_, entry)| match &entry.data {
                CachedPayload::List(items) => items.iter().find(|a| a.id == id).cloned(),
                CachedPayload::Single(_) => None,
            });

        match found {
            Some(article) => {
                cache.set(detail_key, CachedPayload::Single(article.clone()));
                Ok(article)
            }
            None => {
                warn!(%id, cached_entries = cache.len(), "News detail not found in any cached batch");
                Err(NewsError::NotFound(id.to_string()))
            }
        }
    }

    pub fn get_news_detail(&self, id: &str) -> Option<Article> {
        self.try_get_news_detail(id).ok()
    }

    /// Two canned articles served whenever real data cannot be fetched.
    pub fn fallback_news(&self) -> Vec<Article> {
        let now = self.clock.now();
        let stamp = now.timestamp_millis();
        vec![
            Article {
                id: format!("fallback_{stamp}_1"),
                title: "AI技术持续发展，智能应用不断涌现".to_string(),
                description: "人工智能在各行各业持续取得突破，新的智能应用正在改变日常生活。".to_string(),
                content: "<p>人工智能在各行各业持续取得突破，新的智能应用正在改变日常生活。</p>".to_string(),
                url: "#".to_string(),
                image: PLACEHOLDER_IMAGE.to_string(),
                source: "AI新闻社".to_string(),
                published_at: now.to_rfc3339(),
                category: Category::Latest,
            },
            Article {
                id: format!("fallback_{stamp}_2"),
                title: "机器学习算法优化取得新进展".to_string(),
                description: "研究人员改进了模型训练方法，训练效率明显提升。".to_string(),
                content: "<p>研究人员改进了模型训练方法，训练效率明显提升。</p>".to_string(),
                url: "#".to_string(),
                image: PLACEHOLDER_IMAGE.to_string(),
                source: "科技日报".to_string(),
                published_at: (now - Duration::hours(1)).to_rfc3339(),
                category: Category::Latest,
            },
        ]
    }

    fn fallback_after(&self, provider: Provider, err: &NewsError) -> Vec<Article> {
        error!(
            %provider,
            error = %err,
            transient = err.is_transient(),
            "News fetch failed; serving fallback articles"
        );
        self.fallback_news()
    }
}

fn page_params(page: usize, page_size: usize) -> BTreeMap<&'static str, String> {
    BTreeMap::from([("page", page.to_string()), ("pageSize", page_size.to_string())])
}

fn is_provider_key(key: &str) -> bool {
    key.starts_with(&format!("{GNEWS_KEY}_")) || key.starts_with(&format!("{NEWSDATA_KEY}_"))
}
