//! Request interceptors.
//!
//! # Layer Order (outermost first)
//! ```text
//! trace_middleware     (span established before anything else runs)
//!     → metrics_middleware (times the handler, records final status)
//!         → timeout        (408 after the configured limit)
//!             → catch panic (a panicking handler becomes a 500)
//!                 → handler
//! ```
//!
//! Timeouts and panics are converted to responses inside both interceptors,
//! so every exit path is still traced and recorded.

pub mod metrics;
pub mod trace;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use crate::config::MonitorConfig;
use crate::observability::{MetricsStore, TraceLog, TracePropagator};

pub use metrics::metrics_middleware;
pub use trace::trace_middleware;

/// Everything the interceptors need, built once at startup.
#[derive(Debug, Clone)]
pub struct Instrumentation {
    pub metrics: MetricsStore,
    pub tracer: Arc<TracePropagator>,
    pub request_timeout: Duration,
}

impl Instrumentation {
    pub fn new(metrics: MetricsStore, tracer: TracePropagator, request_timeout: Duration) -> Self {
        Self {
            metrics,
            tracer: Arc::new(tracer),
            request_timeout,
        }
    }

    /// Build from configuration, opening the configured trace log.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let service_name = config.observability.service_name.clone();
        let log = TraceLog::open(config.observability.trace_log_path.as_deref());

        Self::new(
            MetricsStore::new(service_name.clone()),
            TracePropagator::new(service_name, log),
            Duration::from_secs(config.timeouts.request_secs),
        )
    }

    /// Wrap every route of `router`, including its fallback.
    #[allow(deprecated)]
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(middleware::from_fn_with_state(
                self.metrics.clone(),
                metrics_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.tracer.clone(),
                trace_middleware,
            ))
    }
}
