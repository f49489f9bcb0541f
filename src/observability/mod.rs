//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers produce:
//!     → tracing spans   → tracing.rs (tracing-opentelemetry bridge)
//!                          → batch processors → stdout / OTLP collector
//!     → tracing events  → logging.rs (trace-id formatter) → stdout
//!
//! logging.rs reads the active span's OpenTelemetry context at log time,
//! so every line carries the trace id of the request that emitted it.
//! ```
//!
//! # Design Decisions
//! - The tracer provider is an explicit value (`Telemetry`), not a global
//! - Export never blocks a request: both exporters run behind batch processors
//! - The subscriber is installed exactly once, at startup

use thiserror::Error;

pub mod logging;
pub mod tracing;

pub use self::logging::{current_trace_id, trace_id_string, TraceIdFormat, NO_TRACE_ID};
pub use self::tracing::{extract_context, inject_context, Telemetry};

/// Errors raised while wiring up logging and span export.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("global subscriber already installed: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to shut down tracer provider: {0}")]
    Shutdown(#[from] opentelemetry_sdk::error::OTelSdkError),
}
