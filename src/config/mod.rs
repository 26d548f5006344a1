//! Configuration module for Sitemap-SEO
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_seo::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use concurrency: {}", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ClassifierKind, Config, CrawlerConfig, ExtractorConfig, UserAgentConfig, DEFAULT_CONCURRENCY,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config, read_config};
pub use validation::{compile_selector, validate, MAX_CONCURRENCY};
