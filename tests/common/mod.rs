//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{body::Body, http::Request, response::Response, Router};
use route_monitor::config::MonitorConfig;
use route_monitor::lifecycle::Shutdown;
use route_monitor::observability::{MetricsStore, TraceLog, TracePropagator};
use route_monitor::{HttpServer, Instrumentation};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Instrumentation with an in-memory trace log.
#[allow(dead_code)]
pub struct Harness {
    pub instrumentation: Instrumentation,
    pub metrics: MetricsStore,
    pub trace_lines: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
pub fn harness(service_name: Option<&str>) -> Harness {
    harness_with_timeout(service_name, Duration::from_secs(5))
}

#[allow(dead_code)]
pub fn harness_with_timeout(service_name: Option<&str>, request_timeout: Duration) -> Harness {
    let service_name = service_name.map(str::to_string);
    let (log, trace_lines) = TraceLog::memory();
    let metrics = MetricsStore::new(service_name.clone());
    let instrumentation = Instrumentation::new(
        metrics.clone(),
        TracePropagator::new(service_name, log),
        request_timeout,
    );

    Harness {
        instrumentation,
        metrics,
        trace_lines,
    }
}

impl Harness {
    /// The server's own router (`/ping`, `/metrics`, fallback).
    #[allow(dead_code)]
    pub fn server_router(&self, config: MonitorConfig) -> Router {
        HttpServer::with_instrumentation(config, self.instrumentation.clone()).router()
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> Vec<String> {
        self.trace_lines.lock().unwrap().clone()
    }
}

/// Send one request through a router.
#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve `config` on an ephemeral local port.
#[allow(dead_code)]
pub async fn spawn_server(harness: &Harness, config: MonitorConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_instrumentation(config, harness.instrumentation.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
