//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject encrypted collector endpoints (export is plaintext gRPC)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DemoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use reqwest::Url;
use thiserror::Error;

use crate::config::schema::DemoConfig;

/// A single violated configuration rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("downstream.url '{0}' is not an absolute http(s) URL")]
    DownstreamUrl(String),

    #[error("downstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.service_name must not be empty")]
    EmptyServiceName,

    #[error("observability.otlp_endpoint '{0}' must use plaintext http://")]
    OtlpEndpoint(String),
}

/// Check every rule and collect all violations.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let url_ok = Url::parse(&config.downstream.url)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false);
    if !url_ok {
        errors.push(ValidationError::DownstreamUrl(config.downstream.url.clone()));
    }

    if config.downstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    if let Some(endpoint) = &config.observability.otlp_endpoint {
        if !endpoint.starts_with("http://") {
            errors.push(ValidationError::OtlpEndpoint(endpoint.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
