//! Machine-readable copy of the generated site's articles.
//!
//! Written to `assets/news.json` next to the stylesheet:
//! ```text
//! {
//!   "generatedAt": "2025-05-06T12:00:00+00:00",
//!   "source": "live" | "prefab",
//!   "articles": { "latest": [...], "ai-tech": [...], "industry": [...] }
//! }
//! ```

use super::DataSource;
use crate::models::{Article, PerCategory};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const NEWS_JSON_PATH: &str = "assets/news.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteData<'a> {
    generated_at: &'a str,
    source: DataSource,
    articles: &'a PerCategory<Vec<Article>>,
}

#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_news_json(
    output_dir: &Path,
    articles: &PerCategory<Vec<Article>>,
    source: DataSource,
    generated_at: &str,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&SiteData {
        generated_at,
        source,
        articles,
    })?;
    let path = output_dir.join(NEWS_JSON_PATH);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote news JSON");
    Ok(())
}
