//! GNews search API.
//!
//! Articles carry no stable id, so one is synthesized from the publication
//! time and the article's position in the batch: `gnews_<unix-seconds>_<index>`.

use super::PLACEHOLDER_IMAGE;
use crate::error::NewsError;
use crate::models::{Article, Category};
use crate::utils::{paragraph, sanitize_id_part};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct GNewsResponse {
    #[serde(rename = "totalArticles", default)]
    pub total_articles: Option<u64>,
    #[serde(default)]
    pub articles: Vec<GNewsArticle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GNewsArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published_at: String,
    pub source: GNewsSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GNewsSource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// GET parameters for a search.
pub fn query_params(
    query: &str,
    max_results: usize,
    language: &str,
    country: &str,
    api_key: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("q", query.to_string()),
        ("lang", language.to_string()),
        ("country", country.to_string()),
        ("max", max_results.to_string()),
        ("apikey", api_key.to_string()),
    ]
}

pub fn parse_response(body: Value) -> Result<GNewsResponse, NewsError> {
    Ok(serde_json::from_value(body)?)
}

/// Map a response onto [`Article`]s tagged with `category`.
pub fn map_articles(response: GNewsResponse, category: Category) -> Vec<Article> {
    response
        .articles
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let stamp = DateTime::parse_from_rfc3339(&raw.published_at)
                .map(|t| t.timestamp().to_string())
                .unwrap_or_else(|_| sanitize_id_part(&raw.published_at));
            let description = raw.description.unwrap_or_default();
            let content = raw
                .content
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| description.clone());
            Article {
                id: format!("gnews_{stamp}_{index}"),
                title: raw.title,
                content: paragraph(&content),
                description,
                url: raw.url,
                image: raw
                    .image
                    .filter(|i| !i.is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
                source: raw.source.name,
                published_at: raw.published_at,
                category,
            }
        })
        .collect()
}
