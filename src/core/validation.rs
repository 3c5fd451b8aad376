//! Validation utilities for configuration values

use std::fmt;
use url::Url;

/// A configuration or input value failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

impl crate::core::error_handling::ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Validate a remote base URL: http(s) scheme and a host part
///
/// The returned URL has no query or fragment and its path ends in `/`, so
/// endpoint paths can be joined onto it.
pub fn validate_base_url(url: &str) -> Result<Url, ValidationError> {
    let trimmed = url.trim();
    let mut parsed = Url::parse(trimmed).map_err(|e| {
        ValidationError::new(&format!("Base URL '{}' is not a valid URL: {}", url, e))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::new(&format!(
            "Base URL '{}' must start with http:// or https://",
            url
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::new(&format!(
            "Base URL '{}' has no host",
            url
        )));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ValidationError::new(&format!(
            "Base URL '{}' cannot carry a query or fragment",
            url
        )));
    }

    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed)
}

/// Validate a strictly positive millisecond duration
pub fn validate_positive_millis(name: &str, value: i64) -> Result<u64, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(&format!(
            "{} must be greater than 0 (got {})",
            name, value
        )));
    }
    Ok(value as u64)
}

/// Validate a non-negative millisecond duration
pub fn validate_non_negative_millis(name: &str, value: i64) -> Result<u64, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(&format!(
            "{} cannot be negative (got {})",
            name, value
        )));
    }
    Ok(value as u64)
}
