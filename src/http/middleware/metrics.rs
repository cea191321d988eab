//! Request metrics middleware.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::observability::{MetricsStore, RouteKey};

/// Time the downstream handler and record one event with its final status.
///
/// Requests that matched no route are recorded under the sentinel pattern.
pub async fn metrics_middleware(
    State(store): State<MetricsStore>,
    request: Request,
    next: Next,
) -> Response {
    let key = RouteKey::new(
        request.method(),
        request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
    );

    let start = Instant::now();
    let response = next.run(request).await;
    store.record(key, start.elapsed(), response.status());

    response
}
