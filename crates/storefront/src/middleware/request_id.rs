//! Request ID middleware for request tracing and correlation.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request id that is trusted as-is.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Use the upstream proxy's `x-request-id` when it looks sane, else a fresh UUID v4.
fn request_id_for(request: &Request) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_UPSTREAM_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Record the request id on the tracing span and Sentry scope, then echo it back.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request_id_for(&request);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request(id: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/shop/tech-store");
        if let Some(id) = id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_reuses_upstream_id() {
        assert_eq!(request_id_for(&request(Some("cf-ray-123"))), "cf-ray-123");
    }

    #[test]
    fn test_generates_uuid_for_missing_or_oversized_id() {
        let generated = request_id_for(&request(None));
        assert!(Uuid::parse_str(&generated).is_ok());

        let oversized = "x".repeat(MAX_UPSTREAM_ID_LEN + 1);
        let generated = request_id_for(&request(Some(&oversized)));
        assert!(Uuid::parse_str(&generated).is_ok());
    }
}
