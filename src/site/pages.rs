//! HTML rendering for the static site.
//!
//! Every page shares one shell: header with navigation, category tabs (list
//! pages only), content, footer. Text fields are escaped; an article's
//! `content` is already an HTML fragment and is emitted as-is.

use crate::models::{Article, Category};
use crate::utils::{escape_html, format_datetime};
use std::fmt::{self, Write};
use urlencoding::encode;

pub const SITE_NAME: &str = "AI新闻推送";
pub const STYLE_CSS: &str = include_str!("../../assets/style.css");
pub const SITE_JS: &str = include_str!("../../assets/site.js");

/// File name of a section's list page.
pub fn category_file(category: Category) -> &'static str {
    match category {
        Category::Latest => "index.html",
        Category::AiTech => "ai-tech.html",
        Category::Industry => "industry.html",
    }
}

/// Link to an article page, relative to the site root.
pub fn detail_href(article: &Article) -> String {
    format!("news/{}.html", encode(&article.id))
}

/// Where the shell is rendered: links are relative, so pages under `news/`
/// need a `../` prefix.
#[derive(Debug, Clone, Copy)]
enum Depth {
    Root,
    News,
}

impl Depth {
    fn prefix(self) -> &'static str {
        match self {
            Depth::Root => "",
            Depth::News => "../",
        }
    }
}

fn write_head(out: &mut String, title: &str, description: &str, depth: Depth) -> fmt::Result {
    let prefix = depth.prefix();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, r#"<html lang="zh-CN">"#)?;
    writeln!(out, "<head>")?;
    writeln!(out, r#"    <meta charset="UTF-8">"#)?;
    writeln!(
        out,
        r#"    <meta name="viewport" content="width=device-width, initial-scale=1.0">"#
    )?;
    writeln!(out, "    <title>{}</title>", escape_html(title))?;
    writeln!(
        out,
        r#"    <meta name="description" content="{}">"#,
        escape_html(description)
    )?;
    writeln!(
        out,
        r#"    <link rel="stylesheet" href="{prefix}assets/style.css">"#
    )?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, r#"    <header class="header">"#)?;
    writeln!(out, r#"        <div class="container header-content">"#)?;
    writeln!(out, r#"            <div class="logo">🤖 {SITE_NAME}</div>"#)?;
    writeln!(out, r#"            <nav class="nav">"#)?;
    Ok(())
}

fn write_nav(out: &mut String, active: Option<Category>, depth: Depth) -> fmt::Result {
    let prefix = depth.prefix();
    for category in Category::ALL {
        let label = match category {
            Category::Latest => "首页",
            other => other.title(),
        };
        let class = if active == Some(category) {
            r#" class="active""#
        } else {
            ""
        };
        writeln!(
            out,
            r#"                <a href="{prefix}{}"{class}>{label}</a>"#,
            category_file(category)
        )?;
    }
    writeln!(out, "            </nav>")?;
    writeln!(out, "        </div>")?;
    writeln!(out, "    </header>")?;
    Ok(())
}

fn write_tabs(out: &mut String, active: Category) -> fmt::Result {
    writeln!(out, r#"        <div class="category-tabs">"#)?;
    for category in Category::ALL {
        let class = if category == active {
            "category-tab active"
        } else {
            "category-tab"
        };
        writeln!(
            out,
            r#"            <a class="{class}" href="{}">{}</a>"#,
            category_file(category),
            category.title()
        )?;
    }
    writeln!(out, "        </div>")?;
    Ok(())
}

fn write_footer(out: &mut String, depth: Depth) -> fmt::Result {
    writeln!(out, r#"    <footer class="footer">"#)?;
    writeln!(out, r#"        <div class="container">"#)?;
    writeln!(out, "            <p>&copy; {SITE_NAME}. 所有权利保留.</p>")?;
    writeln!(out, "            <p>为您提供最新的AI技术资讯和行业动态</p>")?;
    writeln!(out, "        </div>")?;
    writeln!(out, "    </footer>")?;
    writeln!(
        out,
        r#"    <script src="{}assets/site.js"></script>"#,
        depth.prefix()
    )?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(())
}

fn write_card(out: &mut String, article: &Article) -> fmt::Result {
    let title = escape_html(&article.title);
    writeln!(out, r#"            <article class="news-card">"#)?;
    writeln!(out, r#"                <div class="news-card-header">"#)?;
    writeln!(out, r#"                    <div class="news-card-content">"#)?;
    writeln!(
        out,
        r#"                        <h2 class="news-card-title"><a href="{}">{title}</a></h2>"#,
        detail_href(article)
    )?;
    writeln!(
        out,
        r#"                        <p class="news-card-description">{}</p>"#,
        escape_html(&article.description)
    )?;
    writeln!(out, r#"                        <div class="news-card-meta">"#)?;
    writeln!(
        out,
        r#"                            <span class="news-card-source">{}</span>"#,
        escape_html(&article.source)
    )?;
    writeln!(
        out,
        r#"                            <span class="news-card-time" data-time="{}">{}</span>"#,
        escape_html(&article.published_at),
        escape_html(&format_datetime(&article.published_at))
    )?;
    writeln!(out, "                        </div>")?;
    writeln!(out, "                    </div>")?;
    if !article.image.is_empty() {
        writeln!(
            out,
            r#"                    <img src="{}" alt="{title}" class="news-card-image">"#,
            escape_html(&article.image)
        )?;
    }
    writeln!(out, "                </div>")?;
    writeln!(out, "            </article>")?;
    Ok(())
}

/// A section's list page.
pub fn render_category_page(category: Category, articles: &[Article]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let (title, description) = match category {
        Category::Latest => (
            format!("{SITE_NAME} - 最新AI动态"),
            "获取最新的AI新闻和动态，包括ChatGPT、机器学习、深度学习等技术资讯".to_string(),
        ),
        other => (
            format!("{} - {SITE_NAME}", other.title()),
            format!("获取{}的最新资讯", other.title()),
        ),
    };
    write_head(&mut out, &title, &description, Depth::Root)?;
    write_nav(&mut out, Some(category), Depth::Root)?;

    writeln!(out, r#"    <main class="container">"#)?;
    write_tabs(&mut out, category)?;
    writeln!(out, r#"        <div id="news-container">"#)?;
    if articles.is_empty() {
        writeln!(out, r#"            <p class="loading">暂无新闻</p>"#)?;
    }
    for article in articles {
        write_card(&mut out, article)?;
    }
    writeln!(out, "        </div>")?;
    writeln!(out, "    </main>")?;

    write_footer(&mut out, Depth::Root)?;
    Ok(out)
}

/// One article's page under `news/`.
pub fn render_detail_page(article: &Article) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let title = escape_html(&article.title);
    write_head(
        &mut out,
        &format!("{} - {SITE_NAME}", article.title),
        &article.description,
        Depth::News,
    )?;
    write_nav(&mut out, None, Depth::News)?;

    writeln!(out, r#"    <main class="container">"#)?;
    writeln!(out, r#"        <a href="../index.html" class="back-button">← 返回首页</a>"#)?;
    writeln!(out, r#"        <article class="news-detail">"#)?;
    writeln!(out, r#"            <h1 class="news-detail-title">{title}</h1>"#)?;
    writeln!(out, r#"            <div class="news-detail-meta">"#)?;
    writeln!(
        out,
        r#"                <span class="news-card-source">{}</span>"#,
        escape_html(&article.source)
    )?;
    writeln!(
        out,
        r#"                <span class="news-card-time">{}</span>"#,
        escape_html(&format_datetime(&article.published_at))
    )?;
    writeln!(out, "            </div>")?;
    if !article.image.is_empty() {
        writeln!(
            out,
            r#"            <img src="{}" alt="{title}" class="news-detail-image">"#,
            escape_html(&article.image)
        )?;
    }
    writeln!(out, r#"            <div class="news-detail-content">"#)?;
    writeln!(out, "{}", article.content)?;
    writeln!(out, "            </div>")?;
    writeln!(out, r#"            <div class="action-buttons">"#)?;
    writeln!(
        out,
        r#"                <a href="../{}" class="action-button primary-button">查看更多新闻</a>"#,
        category_file(article.category)
    )?;
    if !article.url.is_empty() && article.url != "#" {
        writeln!(
            out,
            r#"                <a href="{}" class="action-button secondary-button" target="_blank" rel="noopener">查看原文</a>"#,
            escape_html(&article.url)
        )?;
    }
    writeln!(out, "            </div>")?;
    writeln!(out, "        </article>")?;
    writeln!(out, "    </main>")?;

    write_footer(&mut out, Depth::News)?;
    Ok(out)
}

/// README placed at the output root.
pub fn render_readme(generated_at: &str) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# {SITE_NAME}静态站点\n")?;
    writeln!(out, "本目录包含生成的静态HTML文件，可以直接部署到任何Web服务器。\n")?;
    writeln!(out, "## 文件结构\n")?;
    for category in Category::ALL {
        writeln!(out, "- `{}` - {}", category_file(category), category.title())?;
    }
    writeln!(out, "- `news/` - 新闻详情页目录")?;
    writeln!(out, "- `assets/` - 样式、脚本与数据文件\n")?;
    writeln!(out, "## 生成时间\n")?;
    writeln!(out, "{generated_at}")?;
    Ok(out)
}
