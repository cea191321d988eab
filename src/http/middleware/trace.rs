//! Trace propagation middleware.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::observability::TracePropagator;

/// Establish the request's span before any handler runs and report it after.
///
/// The span travels in the request extensions; downstream diagnostics are
/// emitted inside a `tracing` span carrying the same identifiers.
pub async fn trace_middleware(
    State(tracer): State<Arc<TracePropagator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let (span, patch) = tracer.begin(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    request.extensions_mut().insert(span.clone());

    let request_span = tracing::info_span!(
        "request",
        trace_id = %span.trace_id,
        span_id = %span.span_id,
        parent_span_id = %span.parent_span_id_or_empty(),
        method = %method,
        path = %path,
    );

    let start = Instant::now();
    let mut response = next.run(request).instrument(request_span).await;
    let duration = start.elapsed();

    tracing::debug!(
        trace_id = %span.trace_id,
        span_id = %span.span_id,
        status = %response.status(),
        duration_ms = duration.as_millis() as u64,
        "Request traced"
    );

    tracer.end(&span, &method, &path, duration, response.status());

    // Set after the handler ran, so a handler cannot replace the span's identifiers.
    let headers = response.headers_mut();
    for (name, value) in patch.iter() {
        headers.insert(name.clone(), value.clone());
    }

    response
}
