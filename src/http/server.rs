//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up the tracing and metrics interceptors
//! - Serve the metrics read endpoint
//! - Bind server to listener with graceful shutdown

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::MonitorConfig;
use crate::http::middleware::Instrumentation;
use crate::http::request::CurrentSpan;
use crate::observability::{MetricsSnapshot, MetricsStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub metrics: MetricsStore,
}

/// The instrumented HTTP service.
pub struct HttpServer {
    router: Router,
    config: MonitorConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: MonitorConfig) -> Self {
        let instrumentation = Instrumentation::from_config(&config);
        Self::with_instrumentation(config, instrumentation)
    }

    /// Create a server around an externally built store and propagator.
    pub fn with_instrumentation(config: MonitorConfig, instrumentation: Instrumentation) -> Self {
        let router = Self::build_router(&config, &instrumentation);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &MonitorConfig, instrumentation: &Instrumentation) -> Router {
        let state = AppState {
            metrics: instrumentation.metrics.clone(),
        };

        let mut router = Router::new().route("/ping", get(ping_handler));
        if config.observability.metrics_enabled {
            router = router.route(&config.observability.metrics_path, get(metrics_handler));
        }

        let router = router.fallback(not_found).with_state(state);

        instrumentation
            .apply(router)
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is received.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service_name = self.config.observability.service_name.as_deref().unwrap_or(""),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

/// Liveness probe.
async fn ping_handler(CurrentSpan(span): CurrentSpan) -> impl IntoResponse {
    tracing::debug!(trace_id = %span.trace_id, "Ping");
    Json(json!({ "message": "pong" }))
}

/// Metrics read endpoint.
async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "No route matched");
    (StatusCode::NOT_FOUND, "No matching route found")
}
