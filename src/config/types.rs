use serde::Deserialize;

/// Default number of fetches allowed in flight at once
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Main configuration structure for Sitemap-SEO
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Sitemap (or sitemap index) URL the crawl starts from
    #[serde(default, rename = "seed-url")]
    pub seed_url: String,

    /// Maximum number of fetches executing at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout", rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Overall deadline for the whole run (seconds); unbounded when absent
    #[serde(default, rename = "deadline-secs")]
    pub deadline_secs: Option<u64>,

    /// How `<loc>` entries are told apart as nested sitemaps or pages
    #[serde(default)]
    pub classifier: ClassifierKind,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            deadline_secs: None,
            classifier: ClassifierKind::default(),
        }
    }
}

/// Selects the sitemap classifier implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Any URL whose path mentions `xml` is a nested sitemap
    #[default]
    Path,
    /// Only paths ending in `.xml` or `.xml.gz` are nested sitemaps
    Extension,
}

/// User-Agent rotation configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAgentConfig {
    /// Replacement pool of User-Agent strings; the built-in pool is used when empty
    #[serde(default)]
    pub pool: Vec<String>,
}

/// CSS selectors used by the default extractor
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_title_selector", rename = "title-selector")]
    pub title_selector: String,

    #[serde(default = "default_heading_selector", rename = "heading-selector")]
    pub heading_selector: String,

    /// Must match a `<meta>` element; its `content` attribute is read
    #[serde(
        default = "default_description_selector",
        rename = "description-selector"
    )]
    pub description_selector: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            title_selector: default_title_selector(),
            heading_selector: default_heading_selector(),
            description_selector: default_description_selector(),
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_title_selector() -> String {
    "title".to_string()
}

fn default_heading_selector() -> String {
    "h1".to_string()
}

fn default_description_selector() -> String {
    "meta[name^=description]".to_string()
}
