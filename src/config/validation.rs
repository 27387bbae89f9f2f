use crate::config::types::{AuditConfig, ContentConfig, FetcherConfig, RunConfig, WeightsConfig};
use crate::ConfigError;

/// Allowed drift of the weight sum away from 1.0
const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Validates the entire configuration
pub fn validate(config: &AuditConfig) -> Result<(), ConfigError> {
    validate_weights(&config.weights)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_run_config(&config.run)?;
    validate_content_config(&config.content)?;
    Ok(())
}

/// Validates category weights
fn validate_weights(weights: &WeightsConfig) -> Result<(), ConfigError> {
    let all = [
        ("crawlability", weights.crawlability),
        ("structured-data", weights.structured_data),
        ("content-structure", weights.content_structure),
        ("eeat", weights.eeat),
    ];

    for (name, weight) in all {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::Validation(format!(
                "weight '{}' must be a non-negative number, got {}",
                name, weight
            )));
        }
    }

    let total = weights.total();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ConfigError::Validation(format!(
            "weights must sum to 1.0, got {}",
            total
        )));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    // max_retries >= 0 is always true for u32, so no check needed

    if config.fetch_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout-ms must be > 0".to_string(),
        ));
    }

    if config.concurrency_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency-limit must be >= 1, got {}",
            config.concurrency_limit
        )));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user-agents cannot be empty".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user-agents cannot contain blank entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates run configuration
fn validate_run_config(config: &RunConfig) -> Result<(), ConfigError> {
    if config.run_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "run-timeout-ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates content heuristics configuration
fn validate_content_config(config: &ContentConfig) -> Result<(), ConfigError> {
    if config.max_paragraph_words == 0 {
        return Err(ConfigError::Validation(
            "max-paragraph-words must be > 0".to_string(),
        ));
    }

    Ok(())
}
