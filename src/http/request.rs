//! Request-scoped trace carrier.
//!
//! The tracing middleware stores the request's [`SpanContext`] in the request
//! extensions. Handlers read it back through [`SpanContextExt`] or the
//! [`CurrentSpan`] extractor.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Request, StatusCode},
};

use crate::observability::SpanContext;

/// Access to the span attached by the tracing middleware.
pub trait SpanContextExt {
    fn span_context(&self) -> Option<&SpanContext>;
}

impl<B> SpanContextExt for Request<B> {
    fn span_context(&self) -> Option<&SpanContext> {
        self.extensions().get::<SpanContext>()
    }
}

impl SpanContextExt for Parts {
    fn span_context(&self) -> Option<&SpanContext> {
        self.extensions.get::<SpanContext>()
    }
}

/// Extractor for the current request's span.
///
/// Rejects with 500 when the tracing middleware is not installed.
#[derive(Debug, Clone)]
pub struct CurrentSpan(pub SpanContext);

impl<S> FromRequestParts<S> for CurrentSpan
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .span_context()
            .cloned()
            .map(CurrentSpan)
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Trace context missing"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_span_context_from_extensions() {
        let span = SpanContext::root();
        let mut request = Request::new(Body::empty());
        assert!(request.span_context().is_none());

        request.extensions_mut().insert(span.clone());
        assert_eq!(request.span_context(), Some(&span));

        let (parts, _) = request.into_parts();
        assert_eq!(parts.span_context(), Some(&span));
    }

    #[tokio::test]
    async fn test_extractor_rejects_without_middleware() {
        let (mut parts, _) = Request::new(Body::empty()).into_parts();
        let rejection = CurrentSpan::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(rejection.0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
