//! Article sets for the static site.
//!
//! Live data comes from three concurrent GNews searches; the embedded prefab
//! dataset stands in when there is no key or any of them fails.

use super::translate::{generate_content, translate_description, translate_title};
use crate::error::{NewsError, Provider};
use crate::http::HttpTransport;
use crate::models::{Article, Category, PerCategory};
use crate::providers::gnews::{self, GNewsArticle};
use crate::utils::paragraph;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::{info, instrument};

pub const SITE_LANGUAGE: &str = "en";
pub const SITE_COUNTRY: &str = "us";

const PREFAB_YAML: &str = include_str!("../../assets/prefab_news.yaml");

/// One live search per section: query, `max`, placeholder image.
fn live_query(category: Category) -> (&'static str, usize, &'static str) {
    match category {
        Category::Latest => (
            r#"AI OR "artificial intelligence" OR ChatGPT OR "machine learning""#,
            15,
            "https://via.placeholder.com/400x200?text=AI+News",
        ),
        Category::AiTech => (
            r#""deep learning" OR "neural network" OR "large language model" OR OpenAI OR Google AI"#,
            10,
            "https://via.placeholder.com/400x200?text=AI+Tech",
        ),
        Category::Industry => (
            r#""AI investment" OR "AI startup" OR "AI market" OR "AI industry""#,
            10,
            "https://via.placeholder.com/400x200?text=AI+Industry",
        ),
    }
}

/// Positional id: `latest_1`, `ai_tech_3`, ...
pub fn site_article_id(category: Category, index: usize) -> String {
    format!("{}_{}", category.as_str().replace('-', "_"), index + 1)
}

/// Shape one wire article for the site.
pub fn shape_article(raw: GNewsArticle, category: Category, index: usize) -> Article {
    let (_, _, placeholder) = live_query(category);
    let description = raw.description.as_deref();
    Article {
        id: site_article_id(category, index),
        title: translate_title(&raw.title),
        description: translate_description(description),
        content: generate_content(description),
        url: raw.url,
        image: raw
            .image
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| placeholder.to_string()),
        source: raw.source.name,
        published_at: raw.published_at,
        category,
    }
}

async fn fetch_section<T: HttpTransport>(
    transport: &T,
    endpoint: &str,
    api_key: &str,
    category: Category,
) -> Result<Vec<Article>, NewsError> {
    let (query, max, _) = live_query(category);
    let params = gnews::query_params(query, max, SITE_LANGUAGE, SITE_COUNTRY, api_key);
    let body = transport.get_json(endpoint, &params).await?;
    let response = gnews::parse_response(body)?;
    Ok(response
        .articles
        .into_iter()
        .enumerate()
        .map(|(index, raw)| shape_article(raw, category, index))
        .collect())
}

/// Fetch all three sections concurrently. Any failure fails the whole set.
#[instrument(level = "info", skip_all, fields(endpoint = %endpoint))]
pub async fn fetch_live<T: HttpTransport>(
    transport: &T,
    endpoint: &str,
    api_key: Option<&str>,
) -> Result<PerCategory<Vec<Article>>, NewsError> {
    let api_key = api_key.ok_or(NewsError::MissingApiKey {
        provider: Provider::GNews,
    })?;
    let (latest, ai_tech, industry) = futures::try_join!(
        fetch_section(transport, endpoint, api_key, Category::Latest),
        fetch_section(transport, endpoint, api_key, Category::AiTech),
        fetch_section(transport, endpoint, api_key, Category::Industry),
    )?;
    info!(
        latest = latest.len(),
        ai_tech = ai_tech.len(),
        industry = industry.len(),
        "Fetched live news"
    );
    Ok(PerCategory {
        latest,
        ai_tech,
        industry,
    })
}

#[derive(Debug, Deserialize)]
struct PrefabItem {
    id: String,
    title: String,
    description: String,
    paragraphs: Vec<String>,
    source: String,
    image: String,
    url: String,
    age_hours: i64,
}

#[derive(Debug, Deserialize)]
struct PrefabFile {
    latest: Vec<PrefabItem>,
    #[serde(rename = "ai-tech")]
    ai_tech: Vec<PrefabItem>,
    industry: Vec<PrefabItem>,
}

/// The embedded offline dataset, each item published at a random moment
/// within its age window before `now`.
pub fn prefab<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Result<PerCategory<Vec<Article>>, NewsError> {
    let file: PrefabFile =
        serde_yaml::from_str(PREFAB_YAML).map_err(|e| NewsError::Config(e.to_string()))?;

    let mut build = |items: Vec<PrefabItem>, category: Category| -> Vec<Article> {
        items
            .into_iter()
            .map(|item| {
                let window = Duration::hours(item.age_hours.max(1)).num_seconds();
                let age = Duration::seconds(rng.random_range(0..window));
                Article {
                    id: item.id,
                    title: item.title,
                    description: item.description,
                    content: item
                        .paragraphs
                        .iter()
                        .map(|p| paragraph(p))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    url: item.url,
                    image: item.image,
                    source: item.source,
                    published_at: (now - age).to_rfc3339(),
                    category,
                }
            })
            .collect()
    };

    Ok(PerCategory {
        latest: build(file.latest, Category::Latest),
        ai_tech: build(file.ai_tech, Category::AiTech),
        industry: build(file.industry, Category::Industry),
    })
}
