//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize telemetry, then logging, then the HTTP server
//! - Bind the listener and begin accepting traffic
//! - On shutdown: drain requests, then flush span exporters
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)
//! - Exporter flush failures are logged; only the server decides the exit status

use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, DemoConfig};
use crate::http::{DownstreamError, HttpServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, ObservabilityError, Telemetry};

/// Optional configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "ot-demo.toml";

/// Fatal error while bringing the service up or down.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error("failed to build downstream client: {0}")]
    Downstream(#[from] DownstreamError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load `path` if it exists, otherwise fall back to defaults.
pub fn resolve_config(path: &Path) -> Result<DemoConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(DemoConfig::default())
    }
}

/// Run the service until a shutdown signal arrives.
pub async fn run(config: DemoConfig) -> Result<(), StartupError> {
    let telemetry = Telemetry::init(&config.observability)?;
    logging::init(&config.observability, &telemetry)?;

    tracing::info!(
        service = %config.observability.service_name,
        bind_address = %config.listener.bind_address,
        otlp_endpoint = ?config.observability.otlp_endpoint,
        console_export = config.observability.console_export,
        "Configuration loaded"
    );

    let server = HttpServer::new(config.clone())?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let served = server.run(listener, server_shutdown).await;
    finish(&telemetry, served)
}

/// Flush span exporters after the server stopped, then report how it stopped.
fn finish(telemetry: &Telemetry, served: std::io::Result<()>) -> Result<(), StartupError> {
    tracing::info!("Flushing span exporters");
    if let Err(e) = telemetry.shutdown() {
        tracing::warn!(error = %e, "Span exporter flush failed");
    }
    served?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObservabilityConfig;
    use opentelemetry::trace::Tracer;

    /// Telemetry exporting to an OTLP endpoint nothing listens on.
    async fn telemetry_without_collector() -> Telemetry {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        Telemetry::init(&ObservabilityConfig {
            console_export: false,
            otlp_endpoint: Some(format!("http://{}", addr)),
            ..ObservabilityConfig::default()
        })
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clean_stop_succeeds_without_a_collector() {
        let telemetry = telemetry_without_collector().await;
        telemetry.tracer().in_span("unexported", |_| {});

        assert!(finish(&telemetry, Ok(())).is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn server_error_still_fails_after_flush() {
        let telemetry = telemetry_without_collector().await;

        let served = Err(std::io::Error::other("accept failed"));
        assert!(matches!(finish(&telemetry, served), Err(StartupError::Io(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("ot-demo-startup-missing.toml");
        let config = resolve_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8000");
    }

    #[test]
    fn present_file_is_loaded_and_validated() {
        let path = std::env::temp_dir().join(format!("ot-demo-startup-{}.toml", std::process::id()));
        std::fs::write(&path, "[downstream]\ntimeout_secs = 0\n").unwrap();

        let result = resolve_config(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
