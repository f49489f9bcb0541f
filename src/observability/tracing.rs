//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the tracer provider and its two exporters (stdout, OTLP/gRPC)
//! - Bridge `tracing` spans into OpenTelemetry spans
//! - Extract trace context from incoming requests
//! - Propagate trace context to downstream requests
//!
//! # Design Decisions
//! - W3C Trace Context headers (`traceparent`, `tracestate`)
//! - Batch export on background threads; request tasks never wait on it
//! - No global provider or propagator is registered

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::trace::{TraceContextExt, TracerProvider as _};
use opentelemetry::Context;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing::Subscriber;
use tracing_opentelemetry::{OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::registry::LookupSpan;

use crate::config::ObservabilityConfig;
use crate::observability::ObservabilityError;

/// Instrumentation scope name for spans created by this crate.
const TRACER_NAME: &str = env!("CARGO_PKG_NAME");

/// Owner of the tracer provider and its exporters.
#[derive(Clone)]
pub struct Telemetry {
    provider: SdkTracerProvider,
}

impl Telemetry {
    /// Build the provider with the exporters enabled in `config`.
    pub fn init(config: &ObservabilityConfig) -> Result<Self, ObservabilityError> {
        let resource = Resource::builder()
            .with_service_name(config.service_name.clone())
            .build();

        let mut builder = SdkTracerProvider::builder().with_resource(resource);

        if config.console_export {
            builder = builder.with_batch_exporter(opentelemetry_stdout::SpanExporter::default());
        }

        if let Some(endpoint) = &config.otlp_endpoint {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint.clone())
                .build()?;
            builder = builder.with_batch_exporter(exporter);
        }

        Ok(Self::from_provider(builder.build()))
    }

    /// Wrap a provider that was built elsewhere.
    pub fn from_provider(provider: SdkTracerProvider) -> Self {
        Self { provider }
    }

    pub fn tracer(&self) -> SdkTracer {
        self.provider.tracer(TRACER_NAME)
    }

    /// Subscriber layer turning `tracing` spans into OpenTelemetry spans.
    pub fn layer<S>(&self) -> OpenTelemetryLayer<S, SdkTracer>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        tracing_opentelemetry::layer().with_tracer(self.tracer())
    }

    /// Flush pending spans and stop the exporters.
    pub fn shutdown(&self) -> Result<(), ObservabilityError> {
        self.provider.shutdown()?;
        Ok(())
    }
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        let Ok(name) = HeaderName::from_bytes(key.as_bytes()) else {
            return;
        };
        if let Ok(value) = HeaderValue::from_str(&value) {
            self.0.insert(name, value);
        }
    }
}

/// Read a remote parent from incoming headers.
///
/// Returns `None` unless the headers carry a valid `traceparent`.
pub fn extract_context(headers: &HeaderMap) -> Option<Context> {
    let cx = TraceContextPropagator::new().extract(&HeaderExtractor(headers));
    if cx.span().span_context().is_valid() {
        Some(cx)
    } else {
        None
    }
}

/// Write `span`'s context into outgoing headers.
pub fn inject_context(span: &tracing::Span, headers: &mut HeaderMap) {
    let cx = span.context();
    TraceContextPropagator::new().inject_context(&cx, &mut HeaderInjector(headers));
}
