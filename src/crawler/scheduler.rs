//! Crawl scheduler for terminal page URLs
//!
//! This module handles:
//! - Fetching every page URL at most once under the concurrency budget
//! - Releasing the budget slot before extraction runs
//! - Running the pluggable extractor on each response
//! - Collecting records while isolating per-page failures

use crate::crawler::extractor::{Extractor, SeoRecord};
use crate::crawler::fetcher::{Fetch, FetchedPage};
use crate::crawler::worklist::{ConcurrencyBudget, PhaseReport, Step, Worklist};
use std::sync::Arc;
use tokio::time::Instant;

/// Fetches page URLs and extracts one [`SeoRecord`] per successful page
///
/// The scheduler coordinates:
/// - Global concurrency limits (shared with sitemap expansion)
/// - Deduplication of the input URLs
/// - Termination once every dispatched page has finished
pub struct CrawlScheduler {
    fetcher: Arc<dyn Fetch>,
    extractor: Arc<dyn Extractor>,
    budget: ConcurrencyBudget,
    deadline: Option<Instant>,
}

impl CrawlScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetch capability
    /// * `extractor` - Strategy applied to every fetched page
    /// * `budget` - Concurrency budget
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        extractor: Arc<dyn Extractor>,
        budget: ConcurrencyBudget,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            budget,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Crawls `urls`, returning records in completion order
    pub async fn crawl(&self, urls: Vec<String>) -> Vec<SeoRecord> {
        self.crawl_with_report(urls).await.items
    }

    /// Like [`crawl`](Self::crawl), also returning the phase statistics
    ///
    /// A page whose fetch or extraction fails is logged and yields no record.
    /// Duplicate input URLs are fetched once.
    pub async fn crawl_with_report(&self, urls: Vec<String>) -> PhaseReport<SeoRecord> {
        tracing::info!(
            "Crawling {} page URLs with concurrency {}",
            urls.len(),
            self.budget.capacity()
        );

        let extractor = Arc::clone(&self.extractor);
        let worklist = Worklist::new("page crawl", Arc::clone(&self.fetcher), self.budget.clone())
            .with_deadline(self.deadline);

        worklist
            .run(urls, move |page: &FetchedPage| {
                let record = extractor.extract(page)?;
                tracing::debug!("Extracted {} ({})", record.url, record.status_code);
                Ok(Step::leaf(record))
            })
            .await
    }
}

/// Crawls `urls` with `extractor` under a fresh budget of `concurrency` slots
pub async fn crawl(
    fetcher: Arc<dyn Fetch>,
    urls: Vec<String>,
    extractor: Arc<dyn Extractor>,
    concurrency: usize,
) -> Vec<SeoRecord> {
    CrawlScheduler::new(fetcher, extractor, ConcurrencyBudget::new(concurrency))
        .crawl(urls)
        .await
}
