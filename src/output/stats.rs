//! Run statistics display
//!
//! Summarizes what each phase of a scrape did, written to stderr by the
//! binary so it never mixes with record output on stdout.

use crate::crawler::{PhaseStats, ScrapeReport};
use crate::SeoError;
use std::io::Write;

/// Writes a human-readable summary of `report` to `writer`
pub fn write_summary<W: Write>(report: &ScrapeReport, writer: &mut W) -> Result<(), SeoError> {
    writeln!(writer, "=== Scrape Summary ===")?;
    writeln!(writer)?;
    write_phase(writer, "Sitemap expansion", &report.expansion)?;
    writeln!(writer, "  Pages discovered:   {}", report.pages_discovered)?;
    writeln!(writer)?;
    write_phase(writer, "Page crawl", &report.crawl)?;
    writeln!(writer, "  Records:            {}", report.records.len())?;

    if report.timed_out() {
        writeln!(writer)?;
        writeln!(writer, "Deadline reached; results are partial.")?;
    }

    Ok(())
}

fn write_phase<W: Write>(writer: &mut W, name: &str, stats: &PhaseStats) -> Result<(), SeoError> {
    writeln!(writer, "{}:", name)?;
    writeln!(writer, "  Fetched:            {}", stats.dispatched)?;
    writeln!(writer, "  Succeeded:          {}", stats.succeeded)?;
    writeln!(writer, "  Failed:             {}", stats.failed)?;
    writeln!(writer, "  Duplicates skipped: {}", stats.duplicates_skipped)?;
    if stats.timed_out {
        writeln!(writer, "  Not processed:      {}", stats.unprocessed)?;
    }
    Ok(())
}

/// Prints the run summary to stderr
pub fn print_summary(report: &ScrapeReport) {
    let stderr = std::io::stderr();
    if let Err(e) = write_summary(report, &mut stderr.lock()) {
        tracing::warn!("Failed to print summary: {}", e);
    }
}
