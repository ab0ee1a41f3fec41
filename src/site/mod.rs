//! Static site generation.
//!
//! Builds a self-contained HTML site from one snapshot of the news:
//!
//! ```text
//! output_dir/
//! ├── index.html          # latest
//! ├── ai-tech.html
//! ├── industry.html
//! ├── news/<id>.html      # one page per article
//! ├── assets/
//! │   ├── style.css
//! │   ├── site.js
//! │   └── news.json
//! ├── README.md
//! └── ...                 # files copied from the public directory
//! ```
//!
//! # Submodules
//!
//! - [`dataset`]: live GNews fetch and the embedded prefab dataset
//! - [`translate`]: term substitution and text shaping for wire copy
//! - [`pages`]: HTML rendering
//! - [`json`]: `assets/news.json`
//!
//! The output directory is wiped first. Failing to fetch live news is not an
//! error (the prefab dataset is used); failing to write anything is.

pub mod dataset;
pub mod json;
pub mod pages;
pub mod translate;

use crate::config::Settings;
use crate::http::HttpTransport;
use crate::models::{Article, Category, PerCategory};
use crate::utils::{ensure_writable_dir, format_datetime};
use chrono::Utc;
use itertools::Itertools;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// Where the generated articles came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Prefab,
}

#[derive(Debug, Clone)]
pub struct SiteOptions {
    pub output_dir: PathBuf,
    /// Files (not directories) in here are copied into the output root.
    pub public_dir: Option<PathBuf>,
    /// Skip the live fetch and use the prefab dataset.
    pub offline: bool,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist-static"),
            public_dir: Some(PathBuf::from("public")),
            offline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub output_dir: PathBuf,
    pub source: DataSource,
    pub articles: PerCategory<usize>,
    pub detail_pages: usize,
    pub copied_files: usize,
}

/// Remove and recreate the output tree.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn init_output_dir(output_dir: &Path) -> Result<(), Box<dyn Error>> {
    if fs::try_exists(output_dir).await? {
        fs::remove_dir_all(output_dir).await?;
    }
    ensure_writable_dir(&output_dir.to_string_lossy()).await?;
    fs::create_dir_all(output_dir.join("news")).await?;
    fs::create_dir_all(output_dir.join("assets")).await?;
    info!("Output directory ready");
    Ok(())
}

async fn load_dataset<T: HttpTransport>(
    transport: &T,
    settings: &Settings,
    offline: bool,
) -> Result<(PerCategory<Vec<Article>>, DataSource), Box<dyn Error>> {
    if !offline {
        match dataset::fetch_live(
            transport,
            &settings.gnews_endpoint,
            settings.gnews_api_key.as_deref(),
        )
        .await
        {
            Ok(articles) => return Ok((articles, DataSource::Live)),
            Err(e) => warn!(error = %e, "Live news unavailable; using prefab dataset"),
        }
    }
    let articles = dataset::prefab(Utc::now(), &mut rand::rng())?;
    Ok((articles, DataSource::Prefab))
}

async fn write_list_pages(output_dir: &Path, articles: &PerCategory<Vec<Article>>) -> Result<(), Box<dyn Error>> {
    for (category, items) in articles.iter() {
        let html = pages::render_category_page(category, items)?;
        let path = output_dir.join(pages::category_file(category));
        fs::write(&path, html).await?;
        info!(path = %path.display(), count = items.len(), "Wrote list page");
    }
    Ok(())
}

/// One page per distinct article id; returns how many were written.
async fn write_detail_pages(output_dir: &Path, articles: &PerCategory<Vec<Article>>) -> Result<usize, Box<dyn Error>> {
    let news_dir = output_dir.join("news");
    let mut written = 0;
    for article in Category::ALL
        .iter()
        .flat_map(|c| articles.get(*c))
        .unique_by(|a| a.id.clone())
    {
        let html = pages::render_detail_page(article)?;
        fs::write(news_dir.join(format!("{}.html", article.id)), html).await?;
        written += 1;
    }
    info!(count = written, "Wrote detail pages");
    Ok(written)
}

/// Copy regular files from `public_dir` into the output root.
#[instrument(level = "info", skip_all, fields(public_dir = %public_dir.display()))]
pub async fn copy_public_files(public_dir: &Path, output_dir: &Path) -> Result<usize, Box<dyn Error>> {
    if !fs::try_exists(public_dir).await? {
        info!("No public directory; nothing to copy");
        return Ok(0);
    }
    let mut copied = 0;
    let mut entries = fs::read_dir(public_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        fs::copy(entry.path(), output_dir.join(entry.file_name())).await?;
        copied += 1;
    }
    info!(count = copied, "Copied public files");
    Ok(copied)
}

/// Generate the whole site.
#[instrument(level = "info", skip_all, fields(output_dir = %options.output_dir.display(), offline = options.offline))]
pub async fn generate<T: HttpTransport>(
    transport: &T,
    settings: &Settings,
    options: &SiteOptions,
) -> Result<GenerateSummary, Box<dyn Error>> {
    let output_dir = options.output_dir.as_path();
    init_output_dir(output_dir).await?;

    let (articles, source) = load_dataset(transport, settings, options.offline).await?;
    info!(
        ?source,
        latest = articles.latest.len(),
        ai_tech = articles.ai_tech.len(),
        industry = articles.industry.len(),
        "Dataset ready"
    );

    write_list_pages(output_dir, &articles).await?;
    let detail_pages = write_detail_pages(output_dir, &articles).await?;

    fs::write(output_dir.join("assets/style.css"), pages::STYLE_CSS).await?;
    fs::write(output_dir.join("assets/site.js"), pages::SITE_JS).await?;
    let generated_at = Utc::now().to_rfc3339();
    json::write_news_json(output_dir, &articles, source, &generated_at).await?;

    let copied_files = match &options.public_dir {
        Some(public_dir) => copy_public_files(public_dir, output_dir).await?,
        None => 0,
    };

    let readme = pages::render_readme(&format_datetime(&generated_at))?;
    fs::write(output_dir.join("README.md"), readme).await?;

    info!(detail_pages, copied_files, "Static site generated");
    Ok(GenerateSummary {
        output_dir: options.output_dir.clone(),
        source,
        articles: PerCategory {
            latest: articles.latest.len(),
            ai_tech: articles.ai_tech.len(),
            industry: articles.industry.len(),
        },
        detail_pages,
        copied_files,
    })
}
