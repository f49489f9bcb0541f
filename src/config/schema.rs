//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the demo.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the demo service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Downstream "service B" settings.
    pub downstream: DownstreamConfig,

    /// Logging and span export settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Downstream service called by `/call-service-b`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Absolute URL fetched with a single GET.
    pub url: String,

    /// Total timeout for the downstream call in seconds.
    pub timeout_secs: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8001/".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `service.name` resource attribute attached to every span.
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Export finished spans to stdout.
    pub console_export: bool,

    /// OTLP/gRPC collector endpoint. `None` disables network export.
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "ot-demo".to_string(),
            log_level: "info".to_string(),
            console_export: true,
            otlp_endpoint: Some("http://localhost:4317".to_string()),
        }
    }
}
