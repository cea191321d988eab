//! Distributed trace propagation.
//!
//! # Responsibilities
//! - Continue a trace chain from inbound `X-Trace-ID` / `X-Span-ID` headers,
//!   or start a new one
//! - Emit one correlated access-log line per completed request
//! - Produce the outbound headers that let a caller continue the chain
//!
//! # Design Decisions
//! - A span is a request-owned value; no request-lifetime state is shared
//! - The parent is kept as an identifier, never a reference to another span
//! - The service name is fixed when the propagator is built

use std::time::Duration;

use axum::http::{header::HeaderName, HeaderMap, HeaderValue, Method, StatusCode};
use uuid::Uuid;

use crate::observability::trace_log::TraceLog;

/// Header carrying the trace chain identifier.
pub const X_TRACE_ID: HeaderName = HeaderName::from_static("x-trace-id");

/// Header carrying the identifier of the span that made the call.
pub const X_SPAN_ID: HeaderName = HeaderName::from_static("x-span-id");

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Identity of one observed unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    pub trace_id: String,
    pub span_id: String,
    /// `None` for the span that started the chain.
    pub parent_span_id: Option<String>,
}

impl SpanContext {
    /// Start a new trace chain.
    pub fn root() -> Self {
        Self {
            trace_id: new_id(),
            span_id: new_id(),
            parent_span_id: None,
        }
    }

    /// Continue a chain whose caller was `parent_span_id` in `trace_id`.
    pub fn continuation(trace_id: impl Into<String>, parent_span_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: new_id(),
            parent_span_id: Some(parent_span_id.into()),
        }
    }

    /// Read the inbound pair. Missing, empty or non-ASCII values mean a new chain.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match (header_str(headers, &X_TRACE_ID), header_str(headers, &X_SPAN_ID)) {
            (Some(trace_id), Some(span_id)) => Self::continuation(trace_id, span_id),
            _ => Self::root(),
        }
    }

    /// A span caused by this one, for calls made while handling the request.
    pub fn child(&self) -> Self {
        Self::continuation(self.trace_id.clone(), self.span_id.clone())
    }

    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }

    /// Parent identifier, empty for a root span.
    pub fn parent_span_id_or_empty(&self) -> &str {
        self.parent_span_id.as_deref().unwrap_or("")
    }

    /// Write this span's identifiers, so the receiver continues the chain from here.
    pub fn inject(&self, headers: &mut HeaderMap) {
        for (name, id) in [(X_TRACE_ID, &self.trace_id), (X_SPAN_ID, &self.span_id)] {
            match HeaderValue::from_str(id) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => tracing::debug!(header = %name, "Identifier is not a valid header value"),
            }
        }
    }

    /// Headers to set on the response for this span.
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        self.inject(&mut headers);
        headers
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Derives span identity at request entry and reports it at completion.
#[derive(Debug, Clone)]
pub struct TracePropagator {
    service_name: Option<String>,
    log: TraceLog,
}

impl TracePropagator {
    pub fn new(service_name: Option<String>, log: TraceLog) -> Self {
        Self { service_name, log }
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Establish the span for an inbound request.
    pub fn begin(&self, inbound: &HeaderMap) -> (SpanContext, HeaderMap) {
        let span = SpanContext::from_headers(inbound);
        let patch = span.to_headers();
        (span, patch)
    }

    /// Finalize a span: write its access-log line and return the outbound headers.
    ///
    /// The headers equal the patch returned by [`Self::begin`] for the same span.
    pub fn end(
        &self,
        span: &SpanContext,
        method: &Method,
        path: &str,
        duration: Duration,
        status: StatusCode,
    ) -> HeaderMap {
        self.log
            .write_line(&self.format_line(span, method, path, duration, status));
        span.to_headers()
    }

    fn format_line(
        &self,
        span: &SpanContext,
        method: &Method,
        path: &str,
        duration: Duration,
        status: StatusCode,
    ) -> String {
        format!(
            "Service: {}, TraceID: {}, SpanID: {}, ParentSpanID: {}, Method: {}, Path: {}, Duration: {}, Status: {}",
            self.service_name.as_deref().unwrap_or(""),
            span.trace_id,
            span.span_id,
            span.parent_span_id_or_empty(),
            method,
            path,
            duration.as_millis(),
            status.as_u16(),
        )
    }
}
