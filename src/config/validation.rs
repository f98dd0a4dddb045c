//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs after CLI overrides, before anything binds

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("lambda.function_name must not be empty")]
    EmptyFunctionName,

    #[error("lambda.endpoint '{0}' is not an http(s) URL")]
    InvalidEndpoint(String),

    #[error("lambda.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("gateway.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.lambda.function_name.trim().is_empty() {
        errors.push(ValidationError::EmptyFunctionName);
    }

    if let Some(endpoint) = config.lambda.endpoint.as_deref().filter(|e| !e.is_empty()) {
        let valid = Url::parse(endpoint)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidEndpoint(endpoint.to_string()));
        }
    }

    if config.lambda.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.gateway.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
