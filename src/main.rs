//! Sitemap-SEO main entry point
//!
//! This is the command-line interface for the Sitemap-SEO scraper.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sitemap_seo::config::{read_config, validate, Config};
use sitemap_seo::crawler::run_scrape;
use sitemap_seo::output::{print_summary, render_records, OutputFormat};

/// Sitemap-SEO: collect on-page SEO metadata for every page in a sitemap
///
/// Expands a sitemap index into its page URLs, fetches each page under a
/// concurrency limit and prints the title, first heading, meta description
/// and status code of every page.
#[derive(Parser, Debug)]
#[command(name = "sitemap-seo")]
#[command(version)]
#[command(about = "Collect SEO metadata for every page in a sitemap", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Sitemap or sitemap index URL (overrides crawler.seed-url)
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Maximum number of fetches in flight (overrides crawler.concurrency)
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds (overrides crawler.request-timeout-secs)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Overall deadline in seconds (overrides crawler.deadline-secs)
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Output format for records
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    tracing::info!(
        "Scraping {} (concurrency {}, timeout {}s)",
        config.crawler.seed_url,
        config.crawler.concurrency,
        config.crawler.request_timeout_secs
    );

    let report = run_scrape(&config).await.context("Scrape failed")?;

    let stdout = std::io::stdout();
    render_records(&report.records, cli.format, &mut stdout.lock())
        .context("Failed to write records")?;

    if !cli.quiet {
        print_summary(&report);
    }

    Ok(())
}

/// Loads the config file (if any), applies command-line overrides and validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            read_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = seed.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(deadline) = cli.deadline {
        config.crawler.deadline_secs = Some(deadline);
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_seo=info,warn"),
            1 => EnvFilter::new("sitemap_seo=debug,info"),
            2 => EnvFilter::new("sitemap_seo=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only records
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
