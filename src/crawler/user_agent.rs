//! User-Agent rotation
//!
//! Every request carries a User-Agent picked at random from a pool of realistic
//! browser strings. The random source is process-wide and seeded once.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, OnceLock};

/// Browser User-Agent strings used when no pool is configured
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/61.0.3163.100 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/61.0.3163.100 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/61.0.3163.100 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/604.1.38 (KHTML, like Gecko) Version/10.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:56.0) Gecko/20100101 Firefox/56.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13) AppleWebKit/604.1.38 (KHTML, like Gecko) Version/11.0 Safari/537.36",
];

static GLOBAL_RNG: OnceLock<Mutex<StdRng>> = OnceLock::new();

fn global_rng() -> &'static Mutex<StdRng> {
    GLOBAL_RNG.get_or_init(|| Mutex::new(StdRng::from_entropy()))
}

/// A fixed pool of User-Agent strings with random selection
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Arc<[String]>,
}

impl UserAgentPool {
    /// Creates a pool from the given strings, falling back to the defaults if empty
    pub fn new(agents: Vec<String>) -> Self {
        if agents.is_empty() {
            return Self::default();
        }
        Self {
            agents: agents.into(),
        }
    }

    /// Picks one User-Agent at random
    pub fn pick(&self) -> &str {
        let index = {
            // Poisoning leaves the generator state intact
            let mut rng = global_rng()
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(0..self.agents.len())
        };
        &self.agents[index]
    }

    /// Returns every User-Agent in the pool
    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
