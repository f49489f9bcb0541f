//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

use ot_demo::config::DemoConfig;
use ot_demo::http::HttpServer;
use ot_demo::observability::{logging, Telemetry};

/// Log lines captured in memory.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// First line containing `needle`.
    pub fn find(&self, needle: &str) -> Option<String> {
        self.lines().into_iter().find(|l| l.contains(needle))
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Thread-scoped telemetry: spans go to memory, logs go to a buffer.
pub struct Harness {
    pub exporter: InMemorySpanExporter,
    pub logs: CapturedLogs,
    _guard: DefaultGuard,
}

impl Harness {
    pub fn install() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let telemetry = Telemetry::from_provider(provider);
        let logs = CapturedLogs::default();

        let subscriber = tracing_subscriber::registry()
            .with(LevelFilter::INFO)
            .with(telemetry.layer())
            .with(logging::layer(logs.clone()));

        Self {
            exporter,
            logs,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    pub fn spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }

    pub fn spans_named(&self, name: &str) -> Vec<SpanData> {
        self.spans().into_iter().filter(|s| s.name == name).collect()
    }

    /// The single span named `name`.
    pub fn span(&self, name: &str) -> SpanData {
        let mut spans = self.spans_named(name);
        assert_eq!(spans.len(), 1, "expected exactly one '{}' span", name);
        spans.remove(0)
    }

    /// Log lines at `level` ("INFO", "ERROR", ...).
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let prefix = format!("[{}] ", level);
        self.logs
            .lines()
            .into_iter()
            .filter(|l| l.starts_with(&prefix))
            .collect()
    }
}

/// Extract the `trace_id=` value from a captured log line.
pub fn trace_id_of(line: &str) -> &str {
    line.split_whitespace()
        .find_map(|word| word.strip_prefix("trace_id="))
        .unwrap_or_else(|| panic!("no trace_id in '{}'", line))
}

pub fn server_with_downstream(url: &str) -> HttpServer {
    let mut config = DemoConfig::default();
    config.downstream.url = url.to_string();
    config.downstream.timeout_secs = 2;
    HttpServer::new(config).unwrap()
}

/// Drive one request through `router` and return status, body and the
/// response's `x-request-id`.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, String, Option<String>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap(), request_id)
}

pub async fn get(router: Router, path: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let (status, body, _) = send(router, request).await;
    (status, body)
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Start a simple mock backend that returns a fixed response.
///
/// Each raw request head it receives is forwarded on the returned channel.
pub async fn start_mock_backend(
    response: &'static str,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let mut head = Vec::new();
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => head.extend_from_slice(&buf[..n]),
                            }
                        }
                        let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}
