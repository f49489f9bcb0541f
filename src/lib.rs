//! OpenTelemetry demo service library.
//!
//! Three HTTP routes doing simulated work under nested spans, with every log
//! line stamped with the active trace id.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::DemoConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::Telemetry;
