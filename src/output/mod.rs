//! Output module for rendering scrape results
//!
//! This module handles:
//! - Rendering SEO records as text or JSON
//! - Printing per-phase crawl statistics

pub mod stats;

pub use stats::{print_summary, write_summary};

use crate::crawler::SeoRecord;
use crate::SeoError;
use std::io::Write;

/// How records are written out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One block of aligned fields per record
    #[default]
    Text,
    /// A JSON array of records
    Json,
}

/// Writes `records` to `writer` in the given format
///
/// Records are sorted by URL so repeated runs print identically; the crawl
/// itself makes no ordering promise.
///
/// # Arguments
///
/// * `records` - The records to render
/// * `format` - Text or JSON
/// * `writer` - Destination (stdout in the binary)
///
/// # Returns
///
/// * `Ok(())` - All records written
/// * `Err(SeoError)` - The writer failed
pub fn render_records<W: Write>(
    records: &[SeoRecord],
    format: OutputFormat,
    writer: &mut W,
) -> Result<(), SeoError> {
    let mut sorted: Vec<&SeoRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.url.cmp(&b.url));

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &sorted).map_err(std::io::Error::from)?;
            writeln!(writer)?;
        }
        OutputFormat::Text => {
            for record in sorted {
                writeln!(writer, "URL:              {}", record.url)?;
                writeln!(writer, "Status:           {}", record.status_code)?;
                writeln!(writer, "Title:            {}", record.title)?;
                writeln!(writer, "H1:               {}", record.h1)?;
                writeln!(writer, "Meta description: {}", record.meta_description)?;
                writeln!(writer)?;
            }
        }
    }

    Ok(())
}
