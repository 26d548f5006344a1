//! Sitemap-SEO: a concurrent sitemap crawler that collects on-page SEO metadata
//!
//! This crate expands a site's sitemap index into the full set of page URLs and
//! then fetches every page under a shared concurrency budget, extracting the
//! title, first heading, meta description and HTTP status of each one.

pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for Sitemap-SEO operations
#[derive(Debug, Error)]
pub enum SeoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SeoError {
    /// Returns true for failures that happened while talking to the server
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SeoError::Http { .. } | SeoError::Timeout { .. } | SeoError::Transport { .. }
        )
    }
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

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Sitemap-SEO operations
pub type Result<T> = std::result::Result<T, SeoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    scrape_sitemap, CrawlScheduler, DefaultExtractor, Extractor, FetchedPage, HttpFetcher,
    SeoRecord, SitemapExpander,
};
