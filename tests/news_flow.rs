use ai_news_site::clock::ManualClock;
use ai_news_site::config::Settings;
use ai_news_site::http::ReqwestTransport;
use ai_news_site::models::Category;
use ai_news_site::store::persistence::{JsonFileStorage, MemoryStorage, READ_HISTORY_KEY};
use ai_news_site::{NewsService, NewsStore};
use chrono::{Duration, Utc};
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;

fn gnews_body(count: usize) -> String {
    let articles: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "title": format!("Story {i}"),
                "description": format!("About story {i}."),
                "content": format!("Full text of story {i}."),
                "url": format!("https://example.com/{i}"),
                "image": null,
                "publishedAt": "2025-05-06T12:00:00Z",
                "source": { "name": "Wire" }
            })
        })
        .collect();
    json!({ "totalArticles": count, "articles": articles }).to_string()
}

fn settings_for(server: &Server, with_keys: bool) -> Settings {
    Settings {
        gnews_api_key: with_keys.then(|| "test-gnews".to_string()),
        newsdata_api_key: with_keys.then(|| "test-newsdata".to_string()),
        gnews_endpoint: format!("{}/search", server.url()),
        newsdata_endpoint: format!("{}/news", server.url()),
        ..Settings::default()
    }
}

fn service_with_clock(settings: Settings, clock: Arc<ManualClock>) -> NewsService {
    let transport = ReqwestTransport::new(settings.request_timeout()).unwrap();
    NewsService::new(transport, settings, clock)
}

#[tokio::test]
async fn test_no_key_serves_fallback_without_network() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let service = NewsService::from_settings(settings_for(&server, false)).unwrap();
    let store = NewsStore::new(Arc::new(service), MemoryStorage::new());
    store.fetch_latest_news(false).await;

    let news = store.latest_news();
    assert_eq!(news.len(), 2);
    assert!(news.iter().all(|a| a.id.starts_with("fallback_")));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_pagination_through_one_upstream_call() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("apikey".into(), "test-gnews".into()),
            Matcher::UrlEncoded("max".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gnews_body(12))
        .expect(1)
        .create_async()
        .await;

    let service = NewsService::from_settings(settings_for(&server, true)).unwrap();
    let store = NewsStore::new(Arc::new(service), MemoryStorage::new());

    store.fetch_latest_news(false).await;
    assert_eq!(store.latest_news().len(), 10);
    assert!(store.has_more(Category::Latest));

    store.fetch_latest_news(false).await;
    assert_eq!(store.latest_news().len(), 12);
    assert!(!store.has_more(Category::Latest));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_cache_expires_after_ttl() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(gnews_body(3))
        .expect(2)
        .create_async()
        .await;

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = service_with_clock(settings_for(&server, true), clock.clone());

    let first = service.get_latest_news(1, 10).await;
    clock.advance(Duration::minutes(9));
    let cached = service.get_latest_news(1, 10).await;
    assert_eq!(first, cached);

    clock.advance(Duration::minutes(2));
    let refreshed = service.get_latest_news(1, 10).await;
    assert_eq!(refreshed.len(), 3);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_is_not_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .expect(3)
        .create_async()
        .await;

    let service = NewsService::from_settings(settings_for(&server, true)).unwrap();
    let first = service.get_latest_news(1, 10).await;
    let second = service.get_latest_news(1, 10).await;
    assert!(first[0].id.starts_with("fallback_"));
    assert!(second[0].id.starts_with("fallback_"));

    let err = service.try_get_latest_news(1, 10).await.unwrap_err();
    assert!(err.is_transient());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_industry_reads_newsdata() {
    let mut server = Server::new_async().await;
    let body = json!({
        "status": "success",
        "totalResults": 1,
        "results": [{
            "article_id": "abc123",
            "title": "Chip maker raises funds",
            "description": "A funding round.",
            "link": "https://example.com/biz",
            "source_id": "biz_wire",
            "pubDate": "2025-05-06 08:00:00"
        }]
    });
    let mock = server
        .mock("GET", "/news")
        .match_query(Matcher::UrlEncoded("category".into(), "business".into()))
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let service = NewsService::from_settings(settings_for(&server, true)).unwrap();
    let store = NewsStore::new(Arc::new(service), MemoryStorage::new());
    store.fetch_industry_news(false).await;

    let news = store.industry_news();
    assert_eq!(news.len(), 1);
    assert_eq!(news[0].id, "newsdata_abc123");
    assert_eq!(news[0].category, Category::Industry);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_detail_history_survives_restart() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(gnews_body(3))
        .create_async()
        .await;
    let storage_dir = tempfile::tempdir().unwrap();

    let service = Arc::new(NewsService::from_settings(settings_for(&server, true)).unwrap());
    let store = NewsStore::new(service.clone(), JsonFileStorage::new(storage_dir.path()));
    store.fetch_latest_news(false).await;
    let ids: Vec<String> = store.latest_news().iter().map(|a| a.id.clone()).collect();

    let detail = store.fetch_news_detail(&ids[0]).await.unwrap();
    assert_eq!(detail.title, "Story 0");
    store.fetch_news_detail(&ids[1]).await;
    store.fetch_news_detail(&ids[0]).await;
    assert_eq!(store.read_news_ids(), vec![ids[0].clone(), ids[1].clone()]);
    assert!(store.read_history()[0].read_at.is_some());

    let file = storage_dir.path().join(format!("{READ_HISTORY_KEY}.json"));
    assert!(file.exists());

    let reopened = NewsStore::new(service, JsonFileStorage::new(storage_dir.path()));
    assert_eq!(reopened.read_news_ids(), vec![ids[0].clone(), ids[1].clone()]);
}
