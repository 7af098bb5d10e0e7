//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check operation entries are well-formed backend paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `backend.base_url`).
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("invalid socket address '{}'", config.listener.bind_address),
        ));
    }

    match Url::parse(&config.backend.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "backend.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("backend.base_url", e.to_string())),
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::new("limits.max_body_size", "must be greater than 0"));
    }

    if config.cors.allowed_origin.trim().is_empty() {
        errors.push(ValidationError::new("cors.allowed_origin", "must not be empty"));
    }

    let credentials = &config.credentials;
    for (field, value) in [
        ("credentials.session_cookie", &credentials.session_cookie),
        ("credentials.csrf_cookie", &credentials.csrf_cookie),
        ("credentials.csrf_header", &credentials.csrf_header),
    ] {
        if value.is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }
    if axum::http::HeaderName::from_bytes(credentials.csrf_header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "credentials.csrf_header",
            format!("invalid header name '{}'", credentials.csrf_header),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    for (name, operation) in &config.operations {
        let field = format!("operations.{}", name);
        if name.trim().is_empty() {
            errors.push(ValidationError::new(field.clone(), "identifier must not be empty"));
        }
        if !operation.path().starts_with('/') {
            errors.push(ValidationError::new(
                field,
                format!("path '{}' must start with '/'", operation.path()),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
