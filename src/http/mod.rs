//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, request span, remote parent)
//!     → handlers.rs (log, open spans, work)
//!         → downstream.rs (GET service B, trace context injected)
//!     → Send fixed body to client
//! ```

pub mod downstream;
pub mod handlers;
pub mod request;
pub mod server;

pub use downstream::{DownstreamError, ServiceBClient};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
