//! # AI News Site
//!
//! Aggregates AI news from GNews and NewsData.io, keeps browsing state
//! (pagination, favorites, read history) and publishes a static site.
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`http`] | GET-and-decode-JSON transport with a request timeout |
//! | [`cache`] | Keyed response cache with a TTL |
//! | [`providers`] | GNews and NewsData wire formats |
//! | [`service`] | Category, search and detail queries with fallback data |
//! | [`store`] | Application state over the service, persisted favorites/history |
//! | [`site`] | Static site generator |
//! | [`server`] | Preview server for a generated site |
//!
//! Supporting modules: [`config`], [`error`], [`clock`], [`models`], [`utils`], [`cli`].

pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod providers;
pub mod server;
pub mod service;
pub mod site;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::NewsError;
pub use models::{Article, Category};
pub use service::NewsService;
pub use store::NewsStore;
