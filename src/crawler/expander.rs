//! Recursive sitemap expansion
//!
//! Starting from a seed sitemap, every `<loc>` entry is either queued as a
//! nested sitemap or collected as a page URL. Sitemaps are fetched in parallel
//! under the shared concurrency budget and each one is fetched at most once,
//! so cyclic sitemap indexes terminate.

use crate::crawler::classifier::{extract_locs, normalize_loc, Classify, PathHeuristic};
use crate::crawler::fetcher::{Fetch, FetchedPage};
use crate::crawler::worklist::{ConcurrencyBudget, PhaseReport, Step, Worklist};
use crate::SeoError;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;

/// Expands a sitemap (index) into the set of page URLs it reaches
pub struct SitemapExpander {
    fetcher: Arc<dyn Fetch>,
    classifier: Arc<dyn Classify>,
    budget: ConcurrencyBudget,
    deadline: Option<Instant>,
}

impl SitemapExpander {
    /// Creates an expander using the default path heuristic
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetch capability
    /// * `budget` - Concurrency budget, usually shared with the page crawl
    pub fn new(fetcher: Arc<dyn Fetch>, budget: ConcurrencyBudget) -> Self {
        Self {
            fetcher,
            classifier: Arc::new(PathHeuristic),
            budget,
            deadline: None,
        }
    }

    /// Replaces the sitemap/page classifier
    pub fn with_classifier(mut self, classifier: Arc<dyn Classify>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns the distinct page URLs reachable from `seed`, in no particular order
    pub async fn expand(&self, seed: &str) -> Vec<String> {
        self.expand_with_report(seed).await.items
    }

    /// Like [`expand`](Self::expand), also returning the phase statistics
    ///
    /// A sitemap that fails to fetch or parse is logged and contributes
    /// nothing; expansion carries on with the rest of the frontier.
    pub async fn expand_with_report(&self, seed: &str) -> PhaseReport<String> {
        tracing::info!("Expanding sitemap {}", seed);

        let classifier = Arc::clone(&self.classifier);
        let worklist = Worklist::new(
            "sitemap expansion",
            Arc::clone(&self.fetcher),
            self.budget.clone(),
        )
        .with_deadline(self.deadline);

        let seeds = vec![normalize_loc(seed).unwrap_or_else(|| seed.to_string())];
        let report = worklist
            .run(seeds, move |page: &FetchedPage| {
                let locs = extract_locs(&page.requested_url, &page.body)
                    .map_err(|e| with_content_type(e, page))?;
                let locs: Vec<String> = locs
                    .iter()
                    .filter_map(|loc| {
                        let normalized = normalize_loc(loc);
                        if normalized.is_none() {
                            tracing::debug!(
                                "Ignoring invalid <loc> {:?} in {}",
                                loc,
                                page.requested_url
                            );
                        }
                        normalized
                    })
                    .collect();

                let (sitemaps, pages) = classifier.classify(locs);
                tracing::debug!(
                    "{}: {} nested sitemaps, {} pages",
                    page.requested_url,
                    sitemaps.len(),
                    pages.len()
                );
                for sitemap in &sitemaps {
                    tracing::info!("Found sitemap: {}", sitemap);
                }

                Ok(Step::new(sitemaps, pages))
            })
            .await;

        // The same page may be listed by several sitemaps
        let mut seen = HashSet::new();
        let items: Vec<String> = report
            .items
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect();

        tracing::info!("Sitemap expansion found {} distinct pages", items.len());

        PhaseReport {
            items,
            stats: report.stats,
        }
    }
}

/// Appends the served Content-Type to a sitemap parse failure
fn with_content_type(error: SeoError, page: &FetchedPage) -> SeoError {
    match (error, page.content_type.as_deref()) {
        (SeoError::Parse { url, message }, Some(content_type)) => SeoError::Parse {
            url,
            message: format!("{} (served as {})", message, content_type),
        },
        (error, _) => error,
    }
}
