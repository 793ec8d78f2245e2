use crate::config::types::{Config, HttpConfig, MonitorConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_monitor_config(&config.monitor)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawl loop configuration
fn validate_monitor_config(config: &MonitorConfig) -> Result<(), ConfigError> {
    // Sleep intervals of zero are allowed; they only remove pacing.

    if config.max_iterations < 1 {
        return Err(ConfigError::Validation(format!(
            "max-iterations must be >= 1, got {}",
            config.max_iterations
        )));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page-size must be >= 1, got {}",
            config.page_size
        )));
    }

    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    if config.connect_timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-seconds must be >= 1, got {}",
            config.connect_timeout_seconds
        )));
    }

    Ok(())
}
