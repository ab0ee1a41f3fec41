//! Upstream news providers.
//!
//! Each submodule knows one provider's wire format: the query parameters it
//! expects and how its articles map onto [`crate::models::Article`].
//!
//! | Provider | Module | Endpoint | Used for |
//! |----------|--------|----------|----------|
//! | GNews | [`gnews`] | `/api/v4/search` | latest, ai-tech, search, static site |
//! | NewsData.io | [`newsdata`] | `/api/1/news` | industry |
//!
//! Both modules export:
//! - `query_params(...)`: the GET parameters, API key included
//! - `parse_response(value)`: typed view of the JSON body
//! - `map_articles(response, category)`: normalized articles with synthesized ids

pub mod gnews;
pub mod newsdata;

/// Image used when a provider has none for an article.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200";
