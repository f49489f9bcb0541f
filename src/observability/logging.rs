//! Structured logging with trace correlation.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Stamp every log line with the active trace id
//! - Configure log level from config, overridable by `RUST_LOG`
//!
//! # Line Format
//! ```text
//! [INFO] trace_id=4bf92f3577b34da6a3ce929d0e0e4736 Handling index request
//! [INFO] trace_id=none Configuration loaded
//! ```
//!
//! # Design Decisions
//! - The trace id is read when the event is formatted, so it always matches
//!   the span that was current when the event was emitted
//! - Formatting only annotates: no event is filtered or rewritten here

use std::fmt;

use opentelemetry::trace::{SpanContext, TraceContextExt, TraceId};
use tracing::{Event, Subscriber};
use tracing_opentelemetry::{OpenTelemetrySpanExt, OtelData};
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::{LookupSpan, SpanRef};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;
use crate::observability::{ObservabilityError, Telemetry};

/// Correlation value used when no trace is active.
pub const NO_TRACE_ID: &str = "none";

/// Render a span context's trace id as 32 lowercase hex digits.
///
/// The all-zero trace id marks an absent context and renders as [`NO_TRACE_ID`].
pub fn trace_id_string(span_context: &SpanContext) -> String {
    format_trace_id(span_context.trace_id())
}

fn format_trace_id(trace_id: TraceId) -> String {
    if trace_id == TraceId::INVALID {
        NO_TRACE_ID.to_string()
    } else {
        format!("{:032x}", trace_id)
    }
}

/// Trace id of the span currently entered on this thread.
///
/// Not usable from inside a subscriber callback; [`TraceIdFormat`] reads the
/// span registry directly instead.
pub fn current_trace_id() -> String {
    let cx = tracing::Span::current().context();
    let span = cx.span();
    trace_id_string(span.span_context())
}

/// Trace id the OpenTelemetry layer assigned to `span`.
///
/// A span with an active parent context (local or remote) belongs to the
/// parent's trace; a root span carries its own freshly generated id.
fn span_trace_id<S>(span: &SpanRef<'_, S>) -> TraceId
where
    S: for<'a> LookupSpan<'a>,
{
    let extensions = span.extensions();
    let Some(data) = extensions.get::<OtelData>() else {
        return TraceId::INVALID;
    };

    if data.parent_cx.has_active_span() {
        data.parent_cx.span().span_context().trace_id()
    } else {
        data.builder.trace_id.unwrap_or(TraceId::INVALID)
    }
}

/// Event formatter producing `[LEVEL] trace_id=<id> <message>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceIdFormat;

impl<S, N> FormatEvent<S, N> for TraceIdFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let trace_id = ctx
            .lookup_current()
            .map(|span| span_trace_id(&span))
            .unwrap_or(TraceId::INVALID);

        let mut fields = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut fields), event)?;

        write!(
            writer,
            "[{}] trace_id={}",
            event.metadata().level(),
            format_trace_id(trace_id)
        )?;
        if !fields.is_empty() {
            write!(writer, " {}", fields)?;
        }
        writeln!(writer)
    }
}

/// fmt layer writing trace-correlated lines to `writer`.
pub fn layer<S, W>(writer: W) -> tracing_subscriber::fmt::Layer<S, DefaultFields, TraceIdFormat, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(TraceIdFormat)
        .with_writer(writer)
        .with_ansi(false)
}

/// Install the process-wide subscriber. Fails if one is already installed.
pub fn init(config: &ObservabilityConfig, telemetry: &Telemetry) -> Result<(), ObservabilityError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry.layer())
        .with(layer(std::io::stdout))
        .try_init()?;

    Ok(())
}
