//! Crawler module for sitemap expansion and page scraping
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with User-Agent rotation
//! - Sitemap parsing and `<loc>` classification
//! - The bounded-concurrency worklist shared by both phases
//! - SEO metadata extraction
//! - Overall scrape coordination

mod classifier;
mod coordinator;
mod expander;
mod extractor;
mod fetcher;
mod scheduler;
mod user_agent;
mod worklist;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::{extract_locs, normalize_loc, Classify, ExtensionClassifier, PathHeuristic};
pub use coordinator::{Coordinator, ScrapeReport};
pub use expander::SitemapExpander;
pub use extractor::{DefaultExtractor, Extractor, SeoRecord};
pub use fetcher::{build_http_client, Fetch, FetchedPage, HttpFetcher};
pub use scheduler::{crawl, CrawlScheduler};
pub use user_agent::{UserAgentPool, DEFAULT_USER_AGENTS};
pub use worklist::{ConcurrencyBudget, Frontier, PhaseReport, PhaseStats, Step, Worklist};

use crate::config::{Config, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Scrapes every page reachable from a sitemap
///
/// Uses the default HTTP fetcher (10 second timeout, rotating User-Agent) and
/// the default classifier. The concurrency budget is shared by sitemap
/// expansion and page crawling.
///
/// # Arguments
///
/// * `seed` - URL of the sitemap or sitemap index
/// * `extractor` - Strategy applied to every fetched page
/// * `concurrency` - Maximum number of fetches in flight
///
/// # Returns
///
/// * `Ok(Vec<SeoRecord>)` - Records for every page fetched and extracted, unordered
/// * `Err(SeoError)` - The HTTP client could not be built
pub async fn scrape_sitemap(
    seed: &str,
    extractor: Arc<dyn Extractor>,
    concurrency: usize,
) -> Result<Vec<SeoRecord>> {
    let fetcher = HttpFetcher::new(
        Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        UserAgentPool::default(),
    )?;

    let report = Coordinator::new(Arc::new(fetcher), extractor, concurrency)
        .run(seed)
        .await;
    Ok(report.records)
}

/// Runs a complete scrape operation from configuration
///
/// This is the main entry point used by the binary. It will:
/// 1. Build the HTTP client, classifier and extractor
/// 2. Expand the seed sitemap into page URLs
/// 3. Fetch and extract every page
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(ScrapeReport)` - Scrape finished (possibly with per-page failures)
/// * `Err(SeoError)` - Setup failed before any request was made
pub async fn run_scrape(config: &Config) -> Result<ScrapeReport> {
    let coordinator = Coordinator::from_config(config)?;
    Ok(coordinator.run(&config.crawler.seed_url).await)
}
