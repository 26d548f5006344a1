//! Scrape coordinator - composes sitemap expansion and page crawling
//!
//! The coordinator owns the pieces that live for a whole run:
//! - The fetcher shared by both phases
//! - The concurrency budget shared by both phases
//! - The optional overall deadline
//!
//! Expansion runs first; its page URLs become the crawl input.

use crate::config::{ClassifierKind, Config};
use crate::crawler::classifier::{Classify, ExtensionClassifier, PathHeuristic};
use crate::crawler::expander::SitemapExpander;
use crate::crawler::extractor::{DefaultExtractor, Extractor, SeoRecord};
use crate::crawler::fetcher::{Fetch, HttpFetcher};
use crate::crawler::scheduler::CrawlScheduler;
use crate::crawler::user_agent::UserAgentPool;
use crate::crawler::worklist::{ConcurrencyBudget, PhaseStats};
use crate::SeoError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a full scrape
#[derive(Debug)]
pub struct ScrapeReport {
    /// One record per page that was fetched and extracted, unordered
    pub records: Vec<SeoRecord>,

    /// Number of distinct page URLs found in the sitemaps
    pub pages_discovered: usize,

    pub expansion: PhaseStats,
    pub crawl: PhaseStats,
}

impl ScrapeReport {
    /// Whether either phase was cut short by the deadline
    pub fn timed_out(&self) -> bool {
        self.expansion.timed_out || self.crawl.timed_out
    }
}

/// Main scrape coordinator structure
pub struct Coordinator {
    fetcher: Arc<dyn Fetch>,
    classifier: Arc<dyn Classify>,
    extractor: Arc<dyn Extractor>,
    concurrency: usize,
    deadline: Option<Duration>,
}

impl Coordinator {
    /// Creates a coordinator with the default classifier and no deadline
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        extractor: Arc<dyn Extractor>,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            classifier: Arc::new(PathHeuristic),
            extractor,
            concurrency,
            deadline: None,
        }
    }

    /// Builds a coordinator from a validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - HTTP client and extractor built
    /// * `Err(SeoError)` - Invalid selector or HTTP client construction failure
    pub fn from_config(config: &Config) -> Result<Self, SeoError> {
        let fetcher = HttpFetcher::new(
            Duration::from_secs(config.crawler.request_timeout_secs),
            UserAgentPool::new(config.user_agent.pool.clone()),
        )?;
        let extractor = DefaultExtractor::from_config(&config.extractor)?;

        let classifier: Arc<dyn Classify> = match config.crawler.classifier {
            ClassifierKind::Path => Arc::new(PathHeuristic),
            ClassifierKind::Extension => Arc::new(ExtensionClassifier),
        };

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(extractor),
            config.crawler.concurrency,
        )
        .with_classifier(classifier)
        .with_deadline(config.crawler.deadline_secs.map(Duration::from_secs)))
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classify>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Bounds the whole run (both phases) by `deadline`
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs expansion then crawling from `seed`
    ///
    /// Per-URL failures never fail the run; they only shrink the result set.
    pub async fn run(&self, seed: &str) -> ScrapeReport {
        let start_time = std::time::Instant::now();
        let budget = ConcurrencyBudget::new(self.concurrency);
        let deadline = self.deadline.map(|d| Instant::now() + d);

        let expansion = SitemapExpander::new(Arc::clone(&self.fetcher), budget.clone())
            .with_classifier(Arc::clone(&self.classifier))
            .with_deadline(deadline)
            .expand_with_report(seed)
            .await;
        let pages_discovered = expansion.items.len();

        let crawl = CrawlScheduler::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            budget,
        )
        .with_deadline(deadline)
        .crawl_with_report(expansion.items)
        .await;

        tracing::info!(
            "Scrape completed: {} records from {} pages in {:?}",
            crawl.items.len(),
            pages_discovered,
            start_time.elapsed()
        );

        ScrapeReport {
            records: crawl.items,
            pages_discovered,
            expansion: expansion.stats,
            crawl: crawl.stats,
        }
    }
}
