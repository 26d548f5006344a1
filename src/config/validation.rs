use crate::config::types::{Config, CrawlerConfig, ExtractorConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Upper bound on the concurrency budget
pub const MAX_CONCURRENCY: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_extractor_config(&config.extractor)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    validate_seed_url(&config.seed_url)?;

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.deadline_secs == Some(0) {
        return Err(ConfigError::Validation(
            "deadline_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// The seed must be an absolute HTTP(S) URL with a host
fn validate_seed_url(seed: &str) -> ConfigResult<()> {
    if seed.is_empty() {
        return Err(ConfigError::Validation(
            "seed_url is required (set crawler.seed-url or pass --seed)".to_string(),
        ));
    }

    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    for agent in &config.pool {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent pool entries cannot be empty".to_string(),
            ));
        }

        // reqwest rejects header values with control characters at request time
        if agent.chars().any(|c| c.is_control()) {
            return Err(ConfigError::Validation(format!(
                "user-agent '{}' contains control characters",
                agent.escape_debug()
            )));
        }
    }

    Ok(())
}

/// Validates extractor selectors by compiling them once
fn validate_extractor_config(config: &ExtractorConfig) -> ConfigResult<()> {
    for selector in [
        &config.title_selector,
        &config.heading_selector,
        &config.description_selector,
    ] {
        compile_selector(selector)?;
    }
    Ok(())
}

/// Compiles a CSS selector, mapping failures to a configuration error
pub fn compile_selector(selector: &str) -> ConfigResult<Selector> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
