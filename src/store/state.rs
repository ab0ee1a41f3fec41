//! Store state and its pure transitions.
//!
//! Nothing here performs I/O; [`super::NewsStore`] drives these transitions and
//! persists afterwards.

use crate::models::{Article, Category, PerCategory, SavedArticle};
use std::collections::HashMap;

/// Read history keeps at most this many entries.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// An independently tracked fetch flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Category(Category),
    Detail,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    pub news: PerCategory<Vec<Article>>,
    /// Next page to fetch, per category (2 after page 1 has loaded).
    pub current_page: PerCategory<usize>,
    pub has_more: PerCategory<bool>,
    pub phases: HashMap<Flow, FetchPhase>,
    pub error: Option<String>,
    pub news_detail: Option<Article>,
    pub search_results: Vec<Article>,
    pub search_query: String,
    /// Most recent first.
    pub favorites: Vec<SavedArticle>,
    /// Most recent first, at most [`HISTORY_LIMIT`] entries.
    pub read_history: Vec<SavedArticle>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            news: PerCategory::default(),
            current_page: PerCategory::splat(1),
            has_more: PerCategory::splat(true),
            phases: HashMap::new(),
            error: None,
            news_detail: None,
            search_results: Vec::new(),
            search_query: String::new(),
            favorites: Vec::new(),
            read_history: Vec::new(),
        }
    }
}

impl StoreState {
    pub fn phase(&self, flow: Flow) -> FetchPhase {
        self.phases.get(&flow).copied().unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.phases.values().any(|p| *p == FetchPhase::Loading)
    }

    /// Enter `Loading` for `flow`. Returns false, changing nothing, if the
    /// flow is already loading and `force` is not set.
    pub fn begin(&mut self, flow: Flow, force: bool) -> bool {
        if self.phase(flow) == FetchPhase::Loading && !force {
            return false;
        }
        self.phases.insert(flow, FetchPhase::Loading);
        self.error = None;
        true
    }

    /// Leave `Loading` for `flow`, recording the error message on failure.
    pub fn finish(&mut self, flow: Flow, outcome: Result<(), String>) {
        match outcome {
            Ok(()) => {
                self.phases.insert(flow, FetchPhase::Success);
            }
            Err(message) => {
                self.phases.insert(flow, FetchPhase::Error);
                self.error = Some(message);
            }
        }
    }

    pub fn page_to_fetch(&self, category: Category, refresh: bool) -> usize {
        if refresh { 1 } else { *self.current_page.get(category) }
    }

    /// Merge a fetched page into the category list.
    ///
    /// A refresh replaces the list and restarts the cursor at page 1; either
    /// way the cursor then moves past the page just fetched. `has_more` is a
    /// heuristic: a full page suggests there may be another.
    pub fn apply_page(&mut self, category: Category, page: Vec<Article>, refresh: bool, page_size: usize) {
        let fetched = page.len();
        let list = self.news.get_mut(category);
        let cursor = self.current_page.get_mut(category);
        if refresh {
            *list = page;
            *cursor = 1;
        } else {
            list.extend(page);
        }
        *cursor += 1;
        *self.has_more.get_mut(category) = fetched >= page_size;
    }

    pub fn reset_pagination(&mut self) {
        self.current_page = PerCategory::splat(1);
        self.has_more = PerCategory::splat(true);
    }

    pub fn apply_search(&mut self, query: &str, page: usize, results: Vec<Article>) {
        self.search_query = query.to_string();
        if page <= 1 {
            self.search_results = results;
        } else {
            self.search_results.extend(results);
        }
    }

    pub fn clear_search(&mut self) {
        self.search_results.clear();
        self.search_query.clear();
    }

    /// Add to the front of favorites unless the id is already there.
    /// Returns whether anything changed.
    pub fn add_favorite(&mut self, article: Article, at: String) -> bool {
        if self.is_favorite(&article.id) {
            return false;
        }
        self.favorites.insert(0, SavedArticle::favorited(article, at));
        true
    }

    /// Remove the favorite with `id`. Returns whether anything changed.
    pub fn remove_favorite(&mut self, id: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|item| item.id() != id);
        self.favorites.len() != before
    }

    /// Move `article` to the front of the history with a fresh read time,
    /// dropping the oldest entries beyond [`HISTORY_LIMIT`].
    pub fn record_read(&mut self, article: Article, at: String) {
        self.read_history.retain(|item| item.id() != article.id);
        self.read_history.insert(0, SavedArticle::read(article, at));
        self.read_history.truncate(HISTORY_LIMIT);
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|item| item.id() == id)
    }

    pub fn favorite_ids(&self) -> Vec<String> {
        self.favorites.iter().map(|item| item.id().to_string()).collect()
    }

    pub fn read_news_ids(&self) -> Vec<String> {
        self.read_history.iter().map(|item| item.id().to_string()).collect()
    }
}
