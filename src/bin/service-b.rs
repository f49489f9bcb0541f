//! Downstream peer for `/call-service-b`.
//!
//! Answers `GET /` with `pong` on 127.0.0.1:8001 and logs the incoming
//! `traceparent`, so trace propagation can be checked by eye.

use axum::{http::HeaderMap, routing::get, Router};
use std::net::SocketAddr;

async fn pong(headers: HeaderMap) -> &'static str {
    let traceparent = headers
        .get("traceparent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none");
    tracing::info!(traceparent = %traceparent, "Received ping");
    "pong"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let app = Router::new().route("/", get(pong));

    let addr = SocketAddr::from(([127, 0, 0, 1], 8001));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "service-b listening");

    axum::serve(listener, app).await?;
    Ok(())
}
