//! Route handlers.
//!
//! Every handler logs on entry, opens its spans, does its (simulated) work,
//! logs on completion and returns a fixed body. Spans are attached with
//! [`Instrument`], so each one closes when its future completes or is dropped.

use std::time::Duration;

use axum::extract::State;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};

use crate::http::server::AppState;

pub const INDEX_BODY: &str = "Hello OpenTelemetry!";
pub const CHAIN_BODY: &str = "Chained spans created";
pub const SERVICE_B_BODY: &str = "Called service B";

const INDEX_WORK: Duration = Duration::from_millis(100);
const CHILD_1_WORK: Duration = Duration::from_millis(50);
const CHILD_2_WORK: Duration = Duration::from_millis(30);

/// `GET /`
pub async fn index() -> &'static str {
    info!("Handling index request");

    async {
        sleep(INDEX_WORK).await;
        info!("Completed some work in index");
    }
    .instrument(info_span!("index-work"))
    .await;

    INDEX_BODY
}

/// `GET /chain`: one parent span with two sequential children.
pub async fn chain() -> &'static str {
    info!("Handling chain request (parent+children spans)");

    async {
        async {
            sleep(CHILD_1_WORK).await;
            info!("Child 1 done");
        }
        .instrument(info_span!("child-span-1"))
        .await;

        async {
            sleep(CHILD_2_WORK).await;
            info!("Child 2 done");
        }
        .instrument(info_span!("child-span-2"))
        .await;
    }
    .instrument(info_span!("parent-span"))
    .await;

    info!("Chain finished");
    CHAIN_BODY
}

/// `GET /call-service-b`
///
/// Downstream failures are logged and swallowed: this route answers 200
/// whatever state service B is in.
pub async fn call_service_b(State(state): State<AppState>) -> &'static str {
    info!("Calling service B");

    match state.service_b.fetch().await {
        Ok(body) => info!("Service B responded: {}", body),
        Err(e) => error!("Failed to call service B: {}", e),
    }

    SERVICE_B_BODY
}
