//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, poll interval within timeout)
//! - Reject static extensions that could never match a URL suffix
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: InterceptConfig → Result<(), Vec<ValidationError>>

use std::net::IpAddr;

use crate::config::schema::InterceptConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &InterceptConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (i, ext) in config.static_extensions.iter().enumerate() {
        let field = format!("static_extensions[{}]", i);
        if ext.is_empty() {
            errors.push(ValidationError::new(field, "extension must not be empty"));
        } else if ext
            .chars()
            .any(|c| c == '.' || c == '/' || c == '?' || c.is_whitespace())
        {
            errors.push(ValidationError::new(
                field,
                format!("extension {:?} must not contain '.', '/', '?' or whitespace", ext),
            ));
        }
    }

    if config.wait.default_timeout_ms == 0 {
        errors.push(ValidationError::new("wait.default_timeout_ms", "must be greater than 0"));
    }

    if config.wait.poll_interval_ms == 0 {
        errors.push(ValidationError::new("wait.poll_interval_ms", "must be greater than 0"));
    } else if config.wait.poll_interval_ms > config.wait.default_timeout_ms {
        errors.push(ValidationError::new(
            "wait.poll_interval_ms",
            "must not exceed wait.default_timeout_ms",
        ));
    }

    if config.websocket.handshake_message.is_empty() {
        errors.push(ValidationError::new("websocket.handshake_message", "must not be empty"));
    }

    let bind_host = &config.websocket.bind_host;
    if bind_host != "localhost" && bind_host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::new(
            "websocket.bind_host",
            format!("{:?} is neither an IP address nor localhost", bind_host),
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("{:?} must be one of {}", config.observability.log_level, LOG_LEVELS.join(", ")),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
