//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request entry:
//!     → tracing.rs (continue or start a trace chain, span carried with the request)
//!
//! Request completion:
//!     → metrics.rs (record count, latency, status per route)
//!     → tracing.rs → trace_log.rs (one correlated access-log line)
//!
//! Consumers:
//!     → Metrics read endpoint (JSON snapshot)
//!     → Trace log file or stderr
//!     → Process diagnostics via logging.rs
//! ```
//!
//! # Design Decisions
//! - Metrics store and propagator are injected, never global
//! - Nothing here can fail a request; sinks degrade instead

pub mod logging;
pub mod metrics;
pub mod trace_log;
pub mod tracing;

pub use self::metrics::{MetricsSnapshot, MetricsStore, RouteKey, RouteSnapshot};
pub use self::trace_log::TraceLog;
pub use self::tracing::{SpanContext, TracePropagator, X_SPAN_ID, X_TRACE_ID};
