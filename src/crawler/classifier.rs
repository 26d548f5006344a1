//! Sitemap document parsing and `<loc>` classification
//!
//! This module handles:
//! - Extracting `<loc>` entries from sitemap and sitemap-index documents
//! - Normalizing entries into absolute HTTP(S) URLs
//! - Splitting entries into nested sitemaps and terminal pages
//!
//! Sitemap indexes and urlsets are treated identically: both are just lists of
//! `<loc>` entries, and the classifier decides what each entry points at.

use crate::{Result, SeoError};
use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

/// Extracts the text of every `<loc>` element in a sitemap document
///
/// Entries are trimmed and empty ones skipped. Order follows the document.
/// Entity references are decoded and CDATA sections are taken verbatim.
///
/// # Arguments
///
/// * `url` - The sitemap URL, used only for error reporting
/// * `body` - The sitemap document
///
/// # Returns
///
/// * `Ok(Vec<String>)` - The `<loc>` entries (possibly none)
/// * `Err(SeoError::Parse)` - The body is not well-formed XML, or has no
///   `<urlset>` or `<sitemapindex>` element
///
/// # Example
///
/// ```
/// use sitemap_seo::crawler::extract_locs;
///
/// let xml = r#"<urlset><url><loc> https://example.com/a </loc></url></urlset>"#;
/// let locs = extract_locs("https://example.com/sitemap.xml", xml).unwrap();
/// assert_eq!(locs, vec!["https://example.com/a".to_string()]);
/// ```
pub fn extract_locs(url: &str, body: &str) -> Result<Vec<String>> {
    let parse_error = |message: String| SeoError::Parse {
        url: url.to_string(),
        message,
    };

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut locs = Vec::new();
    let mut has_root = false;
    // Text collected for the `<loc>` currently open, if any
    let mut current: Option<String> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            parse_error(format!(
                "malformed XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"urlset" | b"sitemapindex" => has_root = true,
                b"loc" => current = Some(String::new()),
                _ => {}
            },
            Event::Empty(e) => {
                if matches!(e.local_name().as_ref(), b"urlset" | b"sitemapindex") {
                    has_root = true;
                }
            }
            Event::Text(e) => {
                if let Some(text) = current.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|e| parse_error(format!("bad entity in <loc>: {}", e)))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"loc" {
                    if let Some(text) = current.take() {
                        let loc = text.trim();
                        if !loc.is_empty() {
                            locs.push(loc.to_string());
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !has_root {
        return Err(parse_error(
            "document has no <urlset> or <sitemapindex> element".to_string(),
        ));
    }

    Ok(locs)
}

/// Normalizes a `<loc>` entry for deduplication
///
/// Returns `None` for entries that are not absolute HTTP(S) URLs. The fragment
/// is removed; everything else is kept as the site wrote it.
pub fn normalize_loc(loc: &str) -> Option<String> {
    let mut url = Url::parse(loc.trim()).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;

    url.set_fragment(None);
    Some(url.into())
}

/// Decides whether a `<loc>` entry is a nested sitemap or a terminal page
///
/// Implementations are pure. An entry that is not clearly a sitemap is a page.
pub trait Classify: Send + Sync {
    /// Returns true if `loc` refers to another sitemap document
    fn is_sitemap(&self, loc: &str) -> bool;

    /// Partitions entries into `(sitemap_refs, page_urls)`
    fn classify(&self, locs: Vec<String>) -> (Vec<String>, Vec<String>) {
        locs.into_iter().partition(|loc| self.is_sitemap(loc))
    }
}

/// Treats any URL whose path mentions `xml` as a nested sitemap
///
/// This is deliberately loose: a page such as `/blog/why-xml-matters` will be
/// misclassified as a sitemap. Use [`ExtensionClassifier`] when that matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathHeuristic;

impl Classify for PathHeuristic {
    fn is_sitemap(&self, loc: &str) -> bool {
        match Url::parse(loc) {
            Ok(url) => url.path().to_ascii_lowercase().contains("xml"),
            Err(_) => loc.to_ascii_lowercase().contains("xml"),
        }
    }
}

/// Only paths ending in `.xml` or `.xml.gz` are nested sitemaps
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionClassifier;

impl Classify for ExtensionClassifier {
    fn is_sitemap(&self, loc: &str) -> bool {
        let path = match Url::parse(loc) {
            Ok(url) => url.path().to_ascii_lowercase(),
            Err(_) => loc.to_ascii_lowercase(),
        };
        path.ends_with(".xml") || path.ends_with(".xml.gz")
    }
}
