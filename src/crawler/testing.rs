//! In-memory fetch fixtures for unit tests

use crate::crawler::fetcher::{Fetch, FetchedPage};
use crate::SeoError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builds a 200 response for `url` with the given body
pub fn page(url: &str, body: &str) -> FetchedPage {
    FetchedPage {
        requested_url: url.to_string(),
        final_url: url.to_string(),
        status_code: 200,
        content_type: Some("text/html".to_string()),
        body: body.to_string(),
    }
}

/// Serves canned pages and records how it was called
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, FetchedPage>,
    failures: HashSet<String>,
    delays: HashMap<String, Duration>,
    latency: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: AtomicUsize,
    counts: Mutex<HashMap<String, usize>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, page: FetchedPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Makes every fetch of `url` fail with a transport error
    pub fn with_failure(mut self, url: &str) -> Self {
        self.failures.insert(url.to_string());
        self
    }

    /// Adds an extra delay to one URL
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Delay applied to every fetch
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.counts.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.counts.lock().unwrap().values().sum()
    }

    /// Highest number of fetches observed executing at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight gauge even when the fetch is aborted
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetch for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, SeoError> {
        *self.counts.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(Arc::clone(&self.in_flight));
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.latency + self.delays.get(url).copied().unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failures.contains(url) {
            return Err(SeoError::Transport {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }

        self.pages.get(url).cloned().ok_or_else(|| SeoError::Transport {
            url: url.to_string(),
            message: "no fixture".to_string(),
        })
    }
}
