//! Bounded-concurrency worklist engine shared by both crawl phases
//!
//! This module handles:
//! - The FIFO frontier and the visited set
//! - Global concurrency limiting via a fair semaphore
//! - Tracking outstanding tasks and detecting termination
//! - Collecting task output in a single owner
//!
//! The driver loop in [`Worklist::run`] owns the frontier, the visited set and
//! the accumulated results. Workers never touch shared state: each one fetches
//! its URL, releases its budget permit, processes the page and hands a [`Step`]
//! back through the `JoinSet`. The run is complete once the frontier is empty
//! and the `JoinSet` has no outstanding tasks.

use crate::crawler::fetcher::{Fetch, FetchedPage};
use crate::SeoError;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;

/// Counting budget bounding the number of fetches in flight
///
/// Cloning shares the same budget, which is how both crawl phases draw from one
/// limit. Acquisition is FIFO.
#[derive(Debug, Clone)]
pub struct ConcurrencyBudget {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyBudget {
    /// Creates a budget of `capacity` slots (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot; the slot is returned when the permit is dropped
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.semaphore.clone().acquire_owned().await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// URLs awaiting dispatch plus the set of URLs already dispatched
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    duplicates: usize,
}

impl Frontier {
    pub fn new<I>(seeds: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut frontier = Self::default();
        for seed in seeds {
            frontier.push(seed);
        }
        frontier
    }

    /// Queues a URL; blank entries are ignored
    pub fn push(&mut self, url: String) {
        if url.trim().is_empty() {
            return;
        }
        self.queue.push_back(url);
    }

    /// Pops the next URL that has not been dispatched yet and marks it visited
    ///
    /// Already-visited entries are discarded and counted as duplicates.
    pub fn pop_unvisited(&mut self) -> Option<String> {
        while let Some(url) = self.queue.pop_front() {
            if self.visited.insert(url.clone()) {
                return Some(url);
            }
            tracing::trace!("Skipping already visited URL: {}", url);
            self.duplicates += 1;
        }
        None
    }

    /// Returns whether anything is queued (visited or not)
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of queued entries not yet dispatched, ignoring duplicates
    pub fn remaining_unvisited(&self) -> usize {
        self.queue
            .iter()
            .filter(|url| !self.visited.contains(*url))
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// What a processed URL contributes to the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<T> {
    /// Further URLs to queue in the same phase
    pub children: Vec<String>,

    /// Results to accumulate
    pub items: Vec<T>,
}

impl<T> Step<T> {
    pub fn new(children: Vec<String>, items: Vec<T>) -> Self {
        Self { children, items }
    }

    /// A step with a single result and no further work
    pub fn leaf(item: T) -> Self {
        Self {
            children: Vec::new(),
            items: vec![item],
        }
    }
}

/// Per-phase counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    /// URLs handed to a worker
    pub dispatched: usize,

    /// Workers that fetched and processed their URL
    pub succeeded: usize,

    /// Workers whose fetch or processing failed
    pub failed: usize,

    /// Queued entries dropped because they had already been dispatched
    pub duplicates_skipped: usize,

    /// Work abandoned when the deadline expired (in flight or still queued)
    pub unprocessed: usize,

    /// Whether the phase was cut short by the deadline
    pub timed_out: bool,
}

/// What a worker hands back to the driver
type Completion<T> = Result<(String, Result<Step<T>, SeoError>), JoinError>;

/// Result of running one phase
#[derive(Debug)]
pub struct PhaseReport<T> {
    pub items: Vec<T>,
    pub stats: PhaseStats,
}

/// The bounded-concurrency worklist driver
#[derive(Clone)]
pub struct Worklist {
    fetcher: Arc<dyn Fetch>,
    budget: ConcurrencyBudget,
    deadline: Option<Instant>,
    phase: &'static str,
}

impl Worklist {
    /// Creates a driver for one phase
    ///
    /// # Arguments
    ///
    /// * `phase` - Name used in log lines
    /// * `fetcher` - Fetch capability shared by every worker
    /// * `budget` - Concurrency budget; clones of one budget share its slots
    pub fn new(phase: &'static str, fetcher: Arc<dyn Fetch>, budget: ConcurrencyBudget) -> Self {
        Self {
            fetcher,
            budget,
            deadline: None,
            phase,
        }
    }

    /// Stops the run at `deadline`, returning whatever has been collected so far
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs the worklist to completion
    ///
    /// Each dispatched URL is fetched while holding one budget slot. The slot is
    /// released as soon as the response is in, then `process` turns the page
    /// into a [`Step`]. Children are queued in this same phase. A failed fetch
    /// or `process` call is logged and contributes nothing.
    ///
    /// # Termination
    ///
    /// Returns when the frontier is empty and no task is outstanding, or when
    /// the deadline passes. In the latter case in-flight tasks are aborted and
    /// they, together with the undispatched frontier, are counted as
    /// `unprocessed`.
    pub async fn run<T, P>(&self, seeds: Vec<String>, process: P) -> PhaseReport<T>
    where
        T: Send + 'static,
        P: Fn(&FetchedPage) -> Result<Step<T>, SeoError> + Send + Sync + 'static,
    {
        let process = Arc::new(process);
        let mut frontier = Frontier::new(seeds);
        let mut tasks: JoinSet<(String, Result<Step<T>, SeoError>)> = JoinSet::new();
        let mut items = Vec::new();
        let mut stats = PhaseStats::default();

        let deadline = self.deadline;
        let expired = sleep_until_deadline(deadline);
        tokio::pin!(expired);

        loop {
            if !frontier.has_pending() && tasks.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = &mut expired => {
                    stats.timed_out = true;
                    // Tasks that finished before the deadline still count
                    while let Some(joined) = tasks.try_join_next() {
                        self.collect(joined, &mut frontier, &mut items, &mut stats);
                    }
                    stats.unprocessed = tasks.len() + frontier.remaining_unvisited();
                    tracing::warn!(
                        "{}: deadline reached, abandoning {} URLs",
                        self.phase,
                        stats.unprocessed
                    );
                    tasks.shutdown().await;
                    break;
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    self.collect(joined, &mut frontier, &mut items, &mut stats);
                }

                permit = self.budget.acquire(), if frontier.has_pending() => {
                    let permit = match permit {
                        Ok(permit) => permit,
                        Err(e) => {
                            tracing::error!("{}: concurrency budget closed: {}", self.phase, e);
                            stats.unprocessed = tasks.len() + frontier.remaining_unvisited();
                            tasks.shutdown().await;
                            break;
                        }
                    };

                    // The permit is dropped here if only duplicates were left
                    let Some(url) = frontier.pop_unvisited() else {
                        continue;
                    };

                    tracing::debug!("{}: dispatching {}", self.phase, url);
                    stats.dispatched += 1;

                    let fetcher = Arc::clone(&self.fetcher);
                    let process = Arc::clone(&process);
                    tasks.spawn(async move {
                        let fetched = fetcher.fetch(&url).await;
                        drop(permit);
                        let result = fetched.and_then(|page| (*process)(&page));
                        (url, result)
                    });
                }
            }
        }

        stats.duplicates_skipped = frontier.duplicates();

        tracing::info!(
            "{} finished: {} dispatched, {} succeeded, {} failed, {} duplicates skipped",
            self.phase,
            stats.dispatched,
            stats.succeeded,
            stats.failed,
            stats.duplicates_skipped
        );

        PhaseReport { items, stats }
    }

    /// Folds one finished worker into the driver's state
    fn collect<T>(
        &self,
        joined: Completion<T>,
        frontier: &mut Frontier,
        items: &mut Vec<T>,
        stats: &mut PhaseStats,
    ) {
        match joined {
            Ok((_, Ok(step))) => {
                stats.succeeded += 1;
                for child in step.children {
                    frontier.push(child);
                }
                items.extend(step.items);
            }
            Ok((url, Err(e))) => {
                stats.failed += 1;
                tracing::warn!("{}: {} failed: {}", self.phase, url, e);
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!("{}: worker task failed: {}", self.phase, e);
            }
        }
    }
}

/// Resolves at `deadline`, or never when there is none
fn sleep_until_deadline(deadline: Option<Instant>) -> impl Future<Output = ()> {
    async move {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}
