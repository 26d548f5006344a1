//! SEO metadata extraction
//!
//! An [`Extractor`] turns a fetched page into a [`SeoRecord`]. The crawl
//! scheduler only depends on the trait, so callers can plug in their own
//! strategy; [`DefaultExtractor`] reads the usual on-page fields with CSS
//! selectors.

use crate::config::{compile_selector, ExtractorConfig};
use crate::crawler::fetcher::FetchedPage;
use crate::{ConfigError, SeoError};
use scraper::{Html, Selector};
use serde::Serialize;

/// On-page SEO metadata for one URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SeoRecord {
    /// Final URL after redirects
    pub url: String,

    /// Text of the first `<title>`
    pub title: String,

    /// Text of the first `<h1>`
    pub h1: String,

    /// Content of the first description meta tag
    pub meta_description: String,

    /// HTTP status code of the response
    pub status_code: u16,
}

/// Strategy for turning a fetched page into a record
///
/// Implementations must be stateless across calls: the same page always
/// produces the same record.
pub trait Extractor: Send + Sync {
    fn extract(&self, page: &FetchedPage) -> Result<SeoRecord, SeoError>;
}

/// Selector-driven extractor for title, first heading and meta description
///
/// Missing elements yield empty strings. Only a page with no document at all
/// (an empty body) is an error.
#[derive(Debug, Clone)]
pub struct DefaultExtractor {
    title: Selector,
    heading: Selector,
    description: Selector,
}

impl DefaultExtractor {
    /// Creates an extractor with the default selectors
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor from configured selectors
    ///
    /// # Returns
    ///
    /// * `Ok(DefaultExtractor)` - All selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - A selector failed to parse
    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: compile_selector(&config.title_selector)?,
            heading: compile_selector(&config.heading_selector)?,
            description: compile_selector(&config.description_selector)?,
        })
    }
}

impl Default for DefaultExtractor {
    fn default() -> Self {
        Self {
            title: Selector::parse("title").expect("static selector"),
            heading: Selector::parse("h1").expect("static selector"),
            description: Selector::parse("meta[name^=description]").expect("static selector"),
        }
    }
}

impl Extractor for DefaultExtractor {
    fn extract(&self, page: &FetchedPage) -> Result<SeoRecord, SeoError> {
        if page.body.trim().is_empty() {
            return Err(SeoError::Parse {
                url: page.final_url.clone(),
                message: "empty document".to_string(),
            });
        }

        let document = Html::parse_document(&page.body);

        let meta_description = document
            .select(&self.description)
            .next()
            .and_then(|element| element.value().attr("content"))
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        Ok(SeoRecord {
            url: page.final_url.clone(),
            title: first_text(&document, &self.title),
            h1: first_text(&document, &self.heading),
            meta_description,
            status_code: page.status_code,
        })
    }
}

/// Trimmed text of the first element matching `selector`, or empty
fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
