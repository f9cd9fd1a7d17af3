//! Quote-Harvester: a concurrent quote and author crawler
//!
//! This crate walks a paginated quotes site, extracts every quote with its
//! tags, enriches each author with biography details from the author's own
//! page, and collects the site's top tags into a single snapshot that can be
//! persisted as JSON.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Quote-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetcher session is not active: {0}")]
    Lifecycle(String),

    #[error("Crawl was cancelled")]
    Cancelled,

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Task failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Quote-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_and_store, CancelToken, Coordinator};
pub use model::{AuthorMap, AuthorRecord, Biography, CrawlResult, Quote, Tag};
pub use state::CrawlPhase;
