use crate::config::types::{Config, CrawlerConfig, LoginConfig, LoginMode, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_login_config(&config.login)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 32 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages must be between 1 and 32, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.retry_backoff_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "retry_backoff_ms must be >= 100ms, got {}ms",
            config.retry_backoff_ms
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetch_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url: {}", e)))?;

    if url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "root_url '{}' must use HTTPS scheme",
            config.root_url
        )));
    }

    if config.login_path.is_empty() || !config.login_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "login_path must be a non-empty path starting with '/', got '{}'",
            config.login_path
        )));
    }

    if config.success_marker.is_empty() {
        return Err(ConfigError::Validation(
            "success_marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates login configuration
fn validate_login_config(config: &LoginConfig) -> Result<(), ConfigError> {
    if config.login_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "login_timeout_secs must be >= 1".to_string(),
        ));
    }

    // Credentials mode needs a usable account; assisted mode does not
    if config.mode == LoginMode::Credentials {
        if config.email.is_empty() || config.password.is_empty() {
            return Err(ConfigError::Validation(
                "credentials login requires both email and password".to_string(),
            ));
        }

        validate_email(&config.email)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
