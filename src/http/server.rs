//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, request span)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use axum::{body::Body, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::DemoConfig;
use crate::http::downstream::{DownstreamError, ServiceBClient};
use crate::http::handlers;
use crate::http::request::{make_request_span, record_response, MakeRequestUuid};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service_b: ServiceBClient,
}

/// HTTP server for the demo routes.
pub struct HttpServer {
    router: Router,
    config: DemoConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: DemoConfig) -> Result<Self, DownstreamError> {
        let state = AppState {
            service_b: ServiceBClient::new(&config.downstream)?,
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/chain", get(handlers::chain))
            .route("/call-service-b", get(handlers::call_service_b))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(make_request_span::<Body>)
                            .on_response(record_response::<Body>),
                    )
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            downstream = %self.config.downstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
