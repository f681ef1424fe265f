use crate::config::types::{ApiConfig, Config, CrawlerConfig, InputConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_crawler_config(&config.crawler)?;
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API access configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "endpoint_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "endpoint_url '{}' has no host",
            config.endpoint_url
        )));
    }

    if config.auth_token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "auth_token cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates pacing and retry configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // rate_limit_cooldown_seconds may be 0 (useful against local mocks)

    if config.request_timeout_seconds == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_seconds must be >= 1".to_string(),
        ));
    }

    let [min, max] = config.inter_task_delay_range_seconds;
    if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
        return Err(ConfigError::Validation(format!(
            "inter_task_delay_range_seconds must satisfy 0 <= min <= max, got [{}, {}]",
            min, max
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

/// Validates input file configuration
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("locations_path", &config.locations_path),
        ("categories_path", &config.categories_path),
        ("schema_path", &config.schema_path),
    ] {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.schema_field_column.is_empty() {
        return Err(ConfigError::Validation(
            "schema_field_column cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.database_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "database_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}
