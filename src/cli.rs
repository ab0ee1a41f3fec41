//! Command-line interface definitions for AI News Site.
//!
//! Global options configure settings and storage; subcommands pick what to do.
//! API keys can be given as flags or through the environment (a `.env` file in
//! the working directory is loaded first).
//!
//! # Examples
//!
//! ```sh
//! # Build the static site, then preview it
//! ai_news_site generate --output-dir ./dist-static
//! ai_news_site serve --dir ./dist-static --port 8080
//!
//! # Browse from the terminal
//! ai_news_site news ai-tech --pages 2
//! ai_news_site search "robotics"
//! ai_news_site favorites add gnews_1746532800_0
//! ```

use crate::models::Category;
use crate::server::DEFAULT_PORT;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding favorites and read history
    #[arg(long, global = true, env = "AI_NEWS_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// GNews API key
    #[arg(long, global = true, env = "GNEWS_API_KEY", hide_env_values = true)]
    pub gnews_api_key: Option<String>,

    /// NewsData.io API key
    #[arg(long, global = true, env = "NEWSDATA_API_KEY", hide_env_values = true)]
    pub newsdata_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Generate the static site
    Generate {
        #[arg(short, long, default_value = "dist-static")]
        output_dir: PathBuf,
        /// Files in this directory are copied into the site root
        #[arg(long, default_value = "public")]
        public_dir: PathBuf,
        /// Use the built-in dataset instead of fetching live news
        #[arg(long)]
        offline: bool,
    },
    /// Serve a generated site for preview
    Serve {
        #[arg(short, long, default_value = "dist-static")]
        dir: PathBuf,
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// List a category's news
    News {
        /// latest, ai-tech or industry
        category: Category,
        /// How many pages to load
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Search news
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one article and record it as read
    Detail { id: String },
    /// Reload the first page of every category
    Refresh,
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Show or clear the read history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum FavoritesAction {
    List,
    /// Add an article from the current news lists
    Add { id: String },
    Remove { id: String },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum HistoryAction {
    List,
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::parse_from(["ai_news_site", "generate"]);
        assert_eq!(
            cli.command,
            Command::Generate {
                output_dir: PathBuf::from("dist-static"),
                public_dir: PathBuf::from("public"),
                offline: false,
            }
        );
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::parse_from(["ai_news_site", "serve", "-d", "/tmp/site", "-p", "9000"]);
        assert_eq!(
            cli.command,
            Command::Serve {
                dir: PathBuf::from("/tmp/site"),
                host: "127.0.0.1".to_string(),
                port: 9000,
            }
        );
    }

    #[test]
    fn test_news_category_is_parsed() {
        let cli = Cli::parse_from(["ai_news_site", "news", "ai-tech", "--pages", "2"]);
        assert_eq!(
            cli.command,
            Command::News {
                category: Category::AiTech,
                pages: 2,
            }
        );
        assert!(Cli::try_parse_from(["ai_news_site", "news", "sports"]).is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "ai_news_site",
            "favorites",
            "add",
            "gnews_1746532800_0",
            "--config",
            "settings.yaml",
            "--gnews-api-key",
            "abc",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("settings.yaml")));
        assert_eq!(cli.gnews_api_key.as_deref(), Some("abc"));
        assert_eq!(
            cli.command,
            Command::Favorites {
                action: FavoritesAction::Add {
                    id: "gnews_1746532800_0".to_string()
                }
            }
        );
    }

    #[test]
    fn test_history_clear() {
        let cli = Cli::parse_from(["ai_news_site", "history", "clear"]);
        assert_eq!(
            cli.command,
            Command::History {
                action: HistoryAction::Clear
            }
        );
    }
}
