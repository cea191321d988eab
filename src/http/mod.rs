//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → middleware/trace.rs (span established, stored in extensions)
//!     → middleware/metrics.rs (timer started)
//!     → handler (reads span via request.rs)
//!     → middleware/metrics.rs (event recorded)
//!     → middleware/trace.rs (log line written, X-Trace-ID / X-Span-ID set)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::Instrumentation;
pub use request::{CurrentSpan, SpanContextExt};
pub use server::HttpServer;
