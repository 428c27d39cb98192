//! Validation utilities for configuration values and CLI arguments

use crate::core::error_handling::ContextualError;

/// Log levels accepted by the logger configuration
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Log formats accepted by the logger configuration
pub const LOG_FORMATS: &[&str] = &["text", "ext", "json"];

/// A user-correctable validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Split comma separated values, trimming whitespace and removing duplicates
/// while preserving first-seen order
pub fn parse_comma_separated(values: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for value in values {
        for part in value.split(',') {
            let part = part.trim();
            if !part.is_empty() && !result.iter().any(|existing| existing == part) {
                result.push(part.to_string());
            }
        }
    }
    result
}

/// Validate a log level name
pub fn validate_log_level(level: &str) -> Result<String, ValidationError> {
    let lowered = level.to_lowercase();
    if LOG_LEVELS.contains(&lowered.as_str()) {
        Ok(lowered)
    } else {
        Err(ValidationError::new(format!(
            "Invalid log level '{}'. Expected one of: {}",
            level,
            LOG_LEVELS.join(", ")
        )))
    }
}

/// Validate a log format name
pub fn validate_log_format(format: &str) -> Result<String, ValidationError> {
    let lowered = format.to_lowercase();
    if LOG_FORMATS.contains(&lowered.as_str()) {
        Ok(lowered)
    } else {
        Err(ValidationError::new(format!(
            "Invalid log format '{}'. Expected one of: {}",
            format,
            LOG_FORMATS.join(", ")
        )))
    }
}
