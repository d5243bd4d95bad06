//! Steeple: organization website structure discovery
//!
//! This crate crawls an organization's homepage, resolves landing-page tricks,
//! extracts the navigation tree and popup pages, performs a bounded breadth-first
//! deep crawl, and extracts domain entities (people, departments, contacts,
//! schedules and media) with layered pattern heuristics.

pub mod analyzer;
pub mod config;
pub mod crawler;
pub mod entry;
pub mod extract;
mod html;
pub mod navigation;
pub mod output;
pub mod popup;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Steeple operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Analyzer error: {0}")]
    Analyzer(#[from] analyzer::AnalyzerError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Steeple operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOptions, Crawler};
pub use state::{CrawlResult, DictionaryEntry, PageInfo, PageType, PopupInfo, SiteStructure};
pub use url::{extract_domain, is_same_domain, normalize_url, resolve_href};
