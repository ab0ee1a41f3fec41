//! # AI News Site
//!
//! Command-line entry point.
//!
//! ## Usage
//!
//! ```sh
//! ai_news_site generate            # build ./dist-static
//! ai_news_site serve               # preview it on http://127.0.0.1:8080
//! ai_news_site news latest         # first page of the latest news
//! ai_news_site detail gnews_1746532800_0   # read one article
//! ```
//!
//! Settings come from defaults, then `--config <yaml>`, then API keys from
//! flags or the environment. Favorites and read history live as JSON files in
//! the storage directory.

use ai_news_site::cli::{Cli, Command, FavoritesAction, HistoryAction};
use ai_news_site::config::{Settings, api_key_from_env};
use ai_news_site::models::{Article, Category, SavedArticle};
use ai_news_site::site::{self, SiteOptions};
use ai_news_site::store::persistence::JsonFileStorage;
use ai_news_site::utils::{format_time, truncate_chars};
use ai_news_site::{NewsService, NewsStore, server};
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

type Store = NewsStore;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    dotenvy::dotenv().ok();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(command = ?args.command, config = ?args.config, "Parsed CLI arguments");

    let settings = load_settings(&args)?;

    match args.command {
        Command::Generate {
            output_dir,
            public_dir,
            offline,
        } => {
            let service = NewsService::from_settings(settings)?;
            let options = SiteOptions {
                output_dir,
                public_dir: Some(public_dir),
                offline,
            };
            let summary = site::generate(service.transport(), service.settings(), &options).await?;
            println!(
                "Generated {} ({:?} data): {} latest, {} ai-tech, {} industry, {} article pages",
                summary.output_dir.display(),
                summary.source,
                summary.articles.latest,
                summary.articles.ai_tech,
                summary.articles.industry,
                summary.detail_pages
            );
        }
        Command::Serve { dir, host, port } => {
            server::serve(&dir, &host, port).await?;
        }
        Command::News { category, pages } => {
            let store = open_store(settings)?;
            for _ in 0..pages.max(1) {
                store.fetch_category(category, false).await;
                if !store.has_more(category) {
                    break;
                }
            }
            print_section(&store, category);
        }
        Command::Search { query, page } => {
            let store = open_store(settings)?;
            store.search_news(&query, page).await;
            println!("Search results for \"{}\" (page {page}):", store.search_query());
            print_articles(&store, &store.search_results());
        }
        Command::Detail { id } => {
            let store = open_store(settings)?;
            store.refresh_all().await;
            match store.fetch_news_detail(&id).await {
                Some(article) => print_detail(&store, &article),
                None => return Err(error_message(&store, &id).into()),
            }
        }
        Command::Refresh => {
            let store = open_store(settings)?;
            store.refresh_all().await;
            for category in Category::ALL {
                print_section(&store, category);
            }
        }
        Command::Favorites { action } => {
            let store = open_store(settings)?;
            match action {
                FavoritesAction::List => print_saved(&store, &store.favorites(), "favorites"),
                FavoritesAction::Add { id } => {
                    store.refresh_all().await;
                    let Some(article) = store.service().get_news_detail(&id) else {
                        return Err(format!("no article with id `{id}` in the current news").into());
                    };
                    if store.add_to_favorites(article) {
                        println!("Added {id} to favorites");
                    } else {
                        println!("{id} is already a favorite");
                    }
                }
                FavoritesAction::Remove { id } => {
                    if store.remove_from_favorites(&id) {
                        println!("Removed {id} from favorites");
                    } else {
                        println!("{id} is not a favorite");
                    }
                }
            }
            if let Some(e) = store.error() {
                return Err(e.into());
            }
        }
        Command::History { action } => {
            let store = open_store(settings)?;
            match action {
                HistoryAction::List => print_saved(&store, &store.read_history(), "read history"),
                HistoryAction::Clear => {
                    store.clear_read_history()?;
                    println!("Read history cleared");
                }
            }
        }
    }

    info!(elapsed = ?start_time.elapsed(), "Done");
    Ok(())
}

fn load_settings(args: &Cli) -> Result<Settings, Box<dyn Error>> {
    let settings = match &args.config {
        Some(path) => Settings::from_yaml_file(path)?,
        None => Settings::default(),
    };
    let mut settings = settings.with_api_keys(
        args.gnews_api_key
            .clone()
            .or_else(|| api_key_from_env("GNEWS_API_KEY")),
        args.newsdata_api_key
            .clone()
            .or_else(|| api_key_from_env("NEWSDATA_API_KEY")),
    );
    if let Some(dir) = &args.storage_dir {
        settings.storage_dir = dir.clone();
    }
    debug!(
        gnews_key = settings.gnews_api_key.is_some(),
        newsdata_key = settings.newsdata_api_key.is_some(),
        storage_dir = %settings.storage_dir.display(),
        "Settings resolved"
    );
    Ok(settings)
}

fn open_store(settings: Settings) -> Result<Store, Box<dyn Error>> {
    let storage = JsonFileStorage::new(settings.storage_dir.clone());
    let service = NewsService::from_settings(settings)?;
    Ok(NewsStore::new(Arc::new(service), storage))
}

fn error_message(store: &Store, id: &str) -> String {
    store
        .error()
        .unwrap_or_else(|| format!("news article not found: {id}"))
}

fn print_section(store: &Store, category: Category) {
    let articles = store.news(category);
    let more = if store.has_more(category) {
        ", more available"
    } else {
        ""
    };
    println!("== {} ({} items{more}) ==", category.title(), articles.len());
    print_articles(store, &articles);
}

fn print_articles(store: &Store, articles: &[Article]) {
    if articles.is_empty() {
        println!("  (no news)");
    }
    for article in articles {
        let marker = if store.is_favorite(&article.id) { "*" } else { " " };
        println!(
            "{marker} [{}] {} | {} | {}",
            article.id,
            truncate_chars(&article.title, 60),
            article.source,
            store.format_relative_time(&article.published_at)
        );
    }
}

fn print_saved(store: &Store, items: &[SavedArticle], label: &str) {
    println!("== {label} ({} items) ==", items.len());
    for item in items {
        let at = item
            .favorited_at
            .as_deref()
            .or(item.read_at.as_deref())
            .map(format_time)
            .unwrap_or_default();
        println!(
            "  [{}] {} | {} | {at}",
            item.id(),
            truncate_chars(&item.article.title, 60),
            store.format_relative_time(&item.article.published_at)
        );
    }
}

fn print_detail(store: &Store, article: &Article) {
    println!("{}", article.title);
    println!(
        "{} | {} ({})",
        article.source,
        format_time(&article.published_at),
        store.format_relative_time(&article.published_at)
    );
    if !article.url.is_empty() {
        println!("{}", article.url);
    }
    println!();
    println!("{}", article.description);
    println!();
    println!("{}", article.content);
}
