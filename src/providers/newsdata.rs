//! NewsData.io latest-news API.

use super::PLACEHOLDER_IMAGE;
use crate::error::NewsError;
use crate::models::{Article, Category};
use crate::utils::paragraph;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct NewsDataResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub results: Vec<NewsDataArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsDataArticle {
    pub article_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
}

/// GET parameters. `provider_category` is NewsData's own taxonomy
/// (`business`, `technology`, ...), not a site [`Category`].
pub fn query_params(
    provider_category: &str,
    query: &str,
    language: &str,
    api_key: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("apikey", api_key.to_string()),
        ("q", query.to_string()),
        ("language", language.to_string()),
        ("category", provider_category.to_string()),
    ]
}

pub fn parse_response(body: Value) -> Result<NewsDataResponse, NewsError> {
    Ok(serde_json::from_value(body)?)
}

pub fn map_articles(response: NewsDataResponse, category: Category) -> Vec<Article> {
    response
        .results
        .into_iter()
        .map(|raw| {
            let description = raw.description.unwrap_or_default();
            let content = raw
                .content
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| description.clone());
            Article {
                id: format!("newsdata_{}", raw.article_id),
                title: raw.title,
                content: paragraph(&content),
                description,
                url: raw.link,
                image: raw
                    .image_url
                    .filter(|i| !i.is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
                source: raw.source_id.unwrap_or_default(),
                published_at: raw.pub_date.unwrap_or_default(),
                category,
            }
        })
        .collect()
}
