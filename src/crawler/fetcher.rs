//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with a bounded per-request timeout
//! - Attaching a rotating User-Agent to every GET
//! - Classifying transport failures
//!
//! Both crawl phases depend on the [`Fetch`] trait rather than on reqwest
//! directly, so tests can substitute in-memory fetchers.

use crate::crawler::user_agent::UserAgentPool;
use crate::SeoError;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

/// A fully received HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The URL that was requested
    pub requested_url: String,

    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code (non-2xx is recorded, not treated as an error)
    pub status_code: u16,

    /// Content-Type header value, if present
    pub content_type: Option<String>,

    /// Response body
    pub body: String,
}

/// Capability to GET a single URL
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url`, returning the full response or a transport error
    async fn fetch(&self, url: &str) -> Result<FetchedPage, SeoError>;
}

/// Builds an HTTP client with proper configuration
///
/// The User-Agent is not set here; [`HttpFetcher`] attaches one per request.
///
/// # Arguments
///
/// * `timeout` - Upper bound for the whole request, body included
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetch`] implementation with User-Agent rotation
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agents: UserAgentPool,
}

impl HttpFetcher {
    /// Creates a fetcher with the given per-request timeout and User-Agent pool
    pub fn new(timeout: Duration, user_agents: UserAgentPool) -> Result<Self, SeoError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            user_agents,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    /// Fetches a URL with a randomly chosen User-Agent
    ///
    /// # Error Mapping
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Any HTTP status | `Ok(FetchedPage)` with `status_code` set |
    /// | Timeout (connect, headers or body) | `SeoError::Timeout` |
    /// | Any other transport failure | `SeoError::Http` |
    async fn fetch(&self, url: &str) -> Result<FetchedPage, SeoError> {
        let user_agent = self.user_agents.pick();
        tracing::trace!("GET {} (User-Agent: {})", url, user_agent);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        tracing::debug!("Fetched {} -> {} ({} bytes)", url, status_code, body.len());

        Ok(FetchedPage {
            requested_url: url.to_string(),
            final_url,
            status_code,
            content_type,
            body,
        })
    }
}

/// Maps a reqwest failure onto the crate error type
fn classify_error(url: &str, error: reqwest::Error) -> SeoError {
    if error.is_timeout() {
        SeoError::Timeout {
            url: url.to_string(),
        }
    } else {
        SeoError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
