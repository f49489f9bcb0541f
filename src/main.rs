//! OpenTelemetry demo service.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                   ot-demo                     │
//!   GET /              │  ┌──────────┐   ┌───────────┐   ┌──────────┐ │
//!   GET /chain     ────┼─▶│ request  │──▶│ handlers  │──▶│downstream│─┼──▶ service B
//!   GET /call-service-b│  │  span    │   │ (spans)   │   │ client   │ │   :8001
//!                      │  └────┬─────┘   └─────┬─────┘   └──────────┘ │
//!                      │       │ spans         │ events               │
//!                      │       ▼               ▼                      │
//!                      │  ┌──────────────┐  ┌────────────────────┐    │
//!                      │  │ tracer       │  │ log formatter      │    │
//!                      │  │ provider     │  │ [LEVEL] trace_id=… │    │
//!                      │  └──┬────────┬──┘  └─────────┬──────────┘    │
//!                      └─────┼────────┼───────────────┼───────────────┘
//!                            ▼        ▼               ▼
//!                         stdout   OTLP :4317       stdout
//! ```

use std::path::Path;

use ot_demo::lifecycle::startup::{self, CONFIG_FILE};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = startup::resolve_config(Path::new(CONFIG_FILE))?;
    startup::run(config).await?;
    Ok(())
}
