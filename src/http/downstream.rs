//! Client for the downstream "service B".
//!
//! # Responsibilities
//! - Issue the single outbound GET made by `/call-service-b`
//! - Carry the caller's trace context in `traceparent`
//!
//! # Design Decisions
//! - One failure kind: any transport, timeout or body error is a
//!   `DownstreamError`; HTTP status codes are not inspected
//! - The client talks to the configured URL directly, never via a proxy

use std::time::Duration;

use axum::http::HeaderMap;
use thiserror::Error;

use crate::config::DownstreamConfig;
use crate::observability::inject_context;

/// The downstream call failed.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DownstreamError(#[from] reqwest::Error);

/// HTTP client bound to one downstream URL.
#[derive(Debug, Clone)]
pub struct ServiceBClient {
    client: reqwest::Client,
    url: String,
}

impl ServiceBClient {
    pub fn new(config: &DownstreamConfig) -> Result<Self, DownstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// GET the downstream URL and return the response body.
    pub async fn fetch(&self) -> Result<String, DownstreamError> {
        let mut headers = HeaderMap::new();
        inject_context(&tracing::Span::current(), &mut headers);

        let response = self.client.get(&self.url).headers(headers).send().await?;
        tracing::debug!(status = %response.status(), url = %self.url, "Downstream responded");

        Ok(response.text().await?)
    }
}
