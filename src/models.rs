//! Data models shared by the fetch layer, the store and the site generator.
//!
//! - [`Category`]: the fixed set of news sections
//! - [`Article`]: a normalized news item, whatever provider it came from
//! - [`SavedArticle`]: an article as kept in favorites or read history
//! - [`PerCategory`]: one value per [`Category`]
//!
//! Field names serialize in camelCase so persisted favorites/history and
//! generated JSON keep the same shape as the browser client's local storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A news section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Latest,
    AiTech,
    Industry,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Latest, Category::AiTech, Category::Industry];

    /// The slug used in cache keys, file names and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Latest => "latest",
            Category::AiTech => "ai-tech",
            Category::Industry => "industry",
        }
    }

    /// Human-facing section title.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Latest => "最新资讯",
            Category::AiTech => "AI技术",
            Category::Industry => "行业动态",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(Category::Latest),
            "ai-tech" => Ok(Category::AiTech),
            "industry" => Ok(Category::Industry),
            other => Err(format!(
                "unknown category `{other}` (expected latest, ai-tech or industry)"
            )),
        }
    }
}

/// A normalized news item.
///
/// Articles are never mutated after they are built from a provider response;
/// favorites and read history wrap them in a [`SavedArticle`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Synthesized id, unique within one fetch batch.
    pub id: String,
    pub title: String,
    pub description: String,
    /// HTML fragment.
    pub content: String,
    pub url: String,
    /// Image URL or a placeholder.
    pub image: String,
    /// Publisher name.
    pub source: String,
    pub published_at: String,
    pub category: Category,
}

/// An article stored in favorites or read history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedArticle {
    #[serde(flatten)]
    pub article: Article,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorited_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
}

impl SavedArticle {
    pub fn favorited(article: Article, at: String) -> Self {
        Self {
            article,
            favorited_at: Some(at),
            read_at: None,
        }
    }

    pub fn read(article: Article, at: String) -> Self {
        Self {
            article,
            favorited_at: None,
            read_at: Some(at),
        }
    }

    pub fn id(&self) -> &str {
        &self.article.id
    }
}

/// One value per [`Category`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerCategory<T> {
    pub latest: T,
    #[serde(rename = "ai-tech")]
    pub ai_tech: T,
    pub industry: T,
}

impl<T> PerCategory<T> {
    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            latest: value.clone(),
            ai_tech: value.clone(),
            industry: value,
        }
    }

    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::Latest => &self.latest,
            Category::AiTech => &self.ai_tech,
            Category::Industry => &self.industry,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Latest => &mut self.latest,
            Category::AiTech => &mut self.ai_tech,
            Category::Industry => &mut self.industry,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

#[cfg(test)]
pub(crate) fn sample_article(id: &str, category: Category) -> Article {
    Article {
        id: id.to_string(),
        title: format!("Title {id}"),
        description: format!("Description {id}"),
        content: format!("<p>Content {id}</p>"),
        url: format!("https://example.com/{id}"),
        image: "https://via.placeholder.com/300x200".to_string(),
        source: "Example Wire".to_string(),
        published_at: "2025-05-06T12:00:00Z".to_string(),
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("sports".parse::<Category>().is_err());
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let article = sample_article("a1", Category::AiTech);
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["publishedAt"], "2025-05-06T12:00:00Z");
        assert_eq!(json["category"], "ai-tech");
    }

    #[test]
    fn test_saved_article_flattens_article_fields() {
        let saved = SavedArticle::read(
            sample_article("a1", Category::Latest),
            "2025-05-06T13:00:00Z".to_string(),
        );
        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["id"], "a1");
        assert_eq!(json["readAt"], "2025-05-06T13:00:00Z");
        assert!(json.get("favoritedAt").is_none());

        let back: SavedArticle = serde_json::from_value(json).unwrap();
        assert_eq!(back, saved);
    }

    #[test]
    fn test_per_category_access() {
        let mut pages = PerCategory::splat(1u32);
        *pages.get_mut(Category::Industry) += 1;
        assert_eq!(*pages.get(Category::Industry), 2);
        assert_eq!(*pages.get(Category::Latest), 1);
        assert_eq!(pages.iter().count(), 3);
    }
}
