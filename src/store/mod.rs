//! Application state: per-category lists with pagination, search, detail,
//! favorites and read history.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`state::StoreState`] | Plain data plus pure transitions |
//! | [`persistence::Persistence`] | Load/save for favorites and read history |
//! | [`NewsStore`] | Drives the service, applies results, persists |
//!
//! The store is an explicit value; callers construct one and share it by
//! reference. Its state sits behind a mutex that is never held across an
//! `.await`, so concurrent flows (see [`NewsStore::refresh_all`]) interleave
//! safely. Each flow has its own [`state::FetchPhase`]; a non-forced fetch of
//! a flow that is already loading is skipped.

pub mod persistence;
pub mod state;

use crate::clock::Clock;
use crate::error::NewsError;
use crate::http::{HttpTransport, ReqwestTransport};
use crate::models::{Article, Category, SavedArticle};
use crate::service::NewsService;
use crate::utils::format_relative_time;
use persistence::{FAVORITES_KEY, JsonFileStorage, Persistence, READ_HISTORY_KEY};
use state::{FetchPhase, Flow, StoreState};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, instrument, warn};

pub struct NewsStore<T = ReqwestTransport, P = JsonFileStorage> {
    service: Arc<NewsService<T>>,
    storage: P,
    clock: Arc<dyn Clock>,
    page_size: usize,
    state: Mutex<StoreState>,
}

impl<T: HttpTransport, P: Persistence> NewsStore<T, P> {
    /// Build a store and restore favorites and read history from `storage`.
    ///
    /// Unreadable persisted lists start empty and leave a message in the
    /// error slot.
    pub fn new(service: Arc<NewsService<T>>, storage: P) -> Self {
        let clock = service.clock();
        let page_size = service.settings().page_size;
        let mut state = StoreState::default();

        match storage.load(FAVORITES_KEY) {
            Ok(items) => state.favorites = items,
            Err(e) => {
                warn!(error = %e, "Could not restore favorites");
                state.error = Some(e.to_string());
            }
        }
        match storage.load(READ_HISTORY_KEY) {
            Ok(mut items) => {
                items.truncate(state::HISTORY_LIMIT);
                state.read_history = items;
            }
            Err(e) => {
                warn!(error = %e, "Could not restore read history");
                state.error = Some(e.to_string());
            }
        }
        debug!(
            favorites = state.favorites.len(),
            history = state.read_history.len(),
            "Restored saved lists"
        );

        Self {
            service,
            storage,
            clock,
            page_size,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now_stamp(&self) -> String {
        self.clock.now().to_rfc3339()
    }

    /// Write one saved list through the persistence adapter; a failure is
    /// logged and left in the error slot.
    fn persist(&self, state: &mut StoreState, key: &str) {
        let items = if key == FAVORITES_KEY {
            &state.favorites
        } else {
            &state.read_history
        };
        if let Err(e) = self.storage.save(key, items) {
            error!(key, error = %e, "Failed to persist list");
            state.error = Some(e.to_string());
        }
    }

    pub fn service(&self) -> &NewsService<T> {
        &self.service
    }

    pub fn storage(&self) -> &P {
        &self.storage
    }

    pub async fn fetch_latest_news(&self, refresh: bool) {
        self.fetch_category(Category::Latest, refresh).await
    }

    pub async fn fetch_ai_tech_news(&self, refresh: bool) {
        self.fetch_category(Category::AiTech, refresh).await
    }

    pub async fn fetch_industry_news(&self, refresh: bool) {
        self.fetch_category(Category::Industry, refresh).await
    }

    /// Fetch the next page of `category`, or page 1 when `refresh` is set.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_category(&self, category: Category, refresh: bool) {
        let flow = Flow::Category(category);
        let page = {
            let mut state = self.state();
            if !state.begin(flow, refresh) {
                debug!("Already loading; skipped");
                return;
            }
            state.page_to_fetch(category, refresh)
        };

        let articles = match category {
            Category::Latest => self.service.get_latest_news(page, self.page_size).await,
            other => {
                self.service
                    .get_news_by_category(other, page, self.page_size)
                    .await
            }
        };

        let mut state = self.state();
        let fetched = articles.len();
        state.apply_page(category, articles, refresh, self.page_size);
        state.finish(flow, Ok(()));
        info!(
            page,
            fetched,
            total = state.news.get(category).len(),
            has_more = *state.has_more.get(category),
            "Applied page"
        );
    }

    /// Look up an article among recent fetches and record it as read.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_news_detail(&self, id: &str) -> Option<Article> {
        self.state().begin(Flow::Detail, true);

        let found = self.service.try_get_news_detail(id);

        let mut state = self.state();
        match found {
            Ok(article) => {
                state.news_detail = Some(article.clone());
                state.record_read(article.clone(), self.now_stamp());
                self.persist(&mut state, READ_HISTORY_KEY);
                let outcome = state.error.clone().map_or(Ok(()), Err);
                state.finish(Flow::Detail, outcome);
                Some(article)
            }
            Err(e) => {
                warn!(error = %e, "Detail lookup failed");
                state.news_detail = None;
                state.finish(Flow::Detail, Err(e.to_string()));
                None
            }
        }
    }

    /// Search; page 1 replaces the results, later pages append.
    #[instrument(level = "info", skip(self))]
    pub async fn search_news(&self, query: &str, page: usize) {
        self.state().begin(Flow::Search, true);

        let results = self.service.search_news(query, page, self.page_size).await;

        let mut state = self.state();
        let fetched = results.len();
        state.apply_search(query, page, results);
        state.finish(Flow::Search, Ok(()));
        info!(fetched, total = state.search_results.len(), "Applied search results");
    }

    /// Returns false if the article was already a favorite.
    pub fn add_to_favorites(&self, article: Article) -> bool {
        let mut state = self.state();
        let id = article.id.clone();
        if !state.add_favorite(article, self.now_stamp()) {
            debug!(id = %id, "Already a favorite");
            return false;
        }
        self.persist(&mut state, FAVORITES_KEY);
        info!(id = %id, count = state.favorites.len(), "Added favorite");
        true
    }

    /// Returns false if no favorite had that id.
    pub fn remove_from_favorites(&self, id: &str) -> bool {
        let mut state = self.state();
        if !state.remove_favorite(id) {
            return false;
        }
        self.persist(&mut state, FAVORITES_KEY);
        info!(id, count = state.favorites.len(), "Removed favorite");
        true
    }

    /// Reset every cursor and reload page 1 of all categories concurrently.
    #[instrument(level = "info", skip_all)]
    pub async fn refresh_all(&self) {
        self.state().reset_pagination();
        futures::join!(
            self.fetch_latest_news(true),
            self.fetch_ai_tech_news(true),
            self.fetch_industry_news(true),
        );
        info!("Refreshed all categories");
    }

    pub fn reset_pagination(&self) {
        self.state().reset_pagination();
    }

    pub fn clear_read_history(&self) -> Result<(), NewsError> {
        let mut state = self.state();
        state.read_history.clear();
        self.storage.remove(READ_HISTORY_KEY).inspect_err(|e| {
            error!(error = %e, "Failed to clear read history");
            state.error = Some(e.to_string());
        })
    }

    pub fn clear_search_results(&self) {
        self.state().clear_search();
    }

    pub fn clear_error(&self) {
        self.state().error = None;
    }

    /// A copy of the whole state.
    pub fn snapshot(&self) -> StoreState {
        self.state().clone()
    }

    pub fn news(&self, category: Category) -> Vec<Article> {
        self.state().news.get(category).clone()
    }

    pub fn latest_news(&self) -> Vec<Article> {
        self.news(Category::Latest)
    }

    pub fn ai_tech_news(&self) -> Vec<Article> {
        self.news(Category::AiTech)
    }

    pub fn industry_news(&self) -> Vec<Article> {
        self.news(Category::Industry)
    }

    pub fn has_more(&self, category: Category) -> bool {
        *self.state().has_more.get(category)
    }

    /// The next page a load-more will request, not the last page loaded.
    /// Starts at 1 and reads 2 right after a refresh has loaded page 1.
    pub fn current_page(&self, category: Category) -> usize {
        *self.state().current_page.get(category)
    }

    pub fn phase(&self, flow: Flow) -> FetchPhase {
        self.state().phase(flow)
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn news_detail(&self) -> Option<Article> {
        self.state().news_detail.clone()
    }

    pub fn search_results(&self) -> Vec<Article> {
        self.state().search_results.clone()
    }

    pub fn search_query(&self) -> String {
        self.state().search_query.clone()
    }

    pub fn favorites(&self) -> Vec<SavedArticle> {
        self.state().favorites.clone()
    }

    pub fn read_history(&self) -> Vec<SavedArticle> {
        self.state().read_history.clone()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.state().is_favorite(id)
    }

    pub fn favorite_ids(&self) -> Vec<String> {
        self.state().favorite_ids()
    }

    pub fn read_news_ids(&self) -> Vec<String> {
        self.state().read_news_ids()
    }

    /// Relative age of a timestamp against the store's clock.
    pub fn format_relative_time(&self, timestamp: &str) -> String {
        format_relative_time(timestamp, self.clock.now())
    }
}
