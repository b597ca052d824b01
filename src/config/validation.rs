use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Checks URL syntax and rejects values that would make the crawl
/// degenerate (zero attempts, empty quotas, inverted jitter range).
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_url(&config.harvester.search_url, "search-url")?;
    validate_url(&config.harvester.index_base_url, "index-base-url")?;
    validate_url(&config.github.api_base_url, "github.api-base-url")?;

    let harvester = &config.harvester;

    if harvester.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if harvester.retry_attempts == 0 {
        return Err(ConfigError::Validation(
            "retry-attempts must be at least 1".to_string(),
        ));
    }

    if harvester.rate_limit_calls == 0 {
        return Err(ConfigError::Validation(
            "rate-limit-calls must be at least 1".to_string(),
        ));
    }

    if harvester.rate_limit_period_secs == 0 {
        return Err(ConfigError::Validation(
            "rate-limit-period-secs must be greater than 0".to_string(),
        ));
    }

    if harvester.jitter_min_secs < 0.0 {
        return Err(ConfigError::Validation(
            "jitter-min-secs must not be negative".to_string(),
        ));
    }

    if harvester.jitter_min_secs > harvester.jitter_max_secs {
        return Err(ConfigError::Validation(
            "jitter-min-secs must not exceed jitter-max-secs".to_string(),
        ));
    }

    let github = &config.github;

    if github.rate_limit_calls_authenticated == 0 || github.rate_limit_calls_unauthenticated == 0 {
        return Err(ConfigError::Validation(
            "github rate-limit-calls must be at least 1".to_string(),
        ));
    }

    if github.rate_limit_period_secs == 0 {
        return Err(ConfigError::Validation(
            "github.rate-limit-period-secs must be greater than 0".to_string(),
        ));
    }

    if config.output.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path must not be empty".to_string(),
        ));
    }

    if config.output.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint-path must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_url(value: &str, field: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map_err(|_| ConfigError::InvalidUrl(format!("{}: {}", field, value)))
        .map(|_| ())
}
