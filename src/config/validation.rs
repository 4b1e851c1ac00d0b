use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, SourceConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on attempts per fetch
const MAX_ATTEMPTS_LIMIT: u32 = 20;

/// Upper bound on concurrently processed periods
const MAX_CONCURRENT_PERIODS_LIMIT: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_http_config(&config.http)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the crawl target and its page markers
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use HTTP or HTTPS, got '{}'",
            config.base_url
        )));
    }

    for (name, value) in [
        ("period_link_selector", &config.period_link_selector),
        ("document_link_pattern", &config.document_link_pattern),
        ("title_selector", &config.title_selector),
        ("authors_marker", &config.authors_marker),
        ("attachment_marker", &config.attachment_marker),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates outbound HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > MAX_ATTEMPTS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and {}, got {}",
            MAX_ATTEMPTS_LIMIT, config.max_attempts
        )));
    }

    if config.max_concurrent_periods < 1
        || config.max_concurrent_periods > MAX_CONCURRENT_PERIODS_LIMIT
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_periods must be between 1 and {}, got {}",
            MAX_CONCURRENT_PERIODS_LIMIT, config.max_concurrent_periods
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.metadata_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "metadata_path cannot be empty".to_string(),
        ));
    }

    if config.attachments_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "attachments_dir cannot be empty".to_string(),
        ));
    }

    if config.summary_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
