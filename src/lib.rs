//! Per-route request metrics and trace propagation for Axum services.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::MonitorConfig;
pub use http::{HttpServer, Instrumentation};
pub use lifecycle::Shutdown;
pub use observability::{MetricsStore, SpanContext, TracePropagator};
