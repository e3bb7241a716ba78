//! Per-request correlation IDs.
//!
//! Every request gets an ID that shows up in the tracing span, in Sentry
//! tags, and in the response headers, so one slow page can be chased across
//! all three.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// Header the ID is read from and echoed back on.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID we accept before minting our own.
const MAX_ID_LEN: usize = 64;

/// Attach a correlation ID to the request.
///
/// A reverse proxy in front of us may already have assigned one; reuse it so
/// our logs line up with theirs. Anything missing, unprintable, or oversized
/// is replaced with a fresh UUID v4.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        upstream_id(&request).map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    // Echo it so a shopper's bug report can quote the ID.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// A usable ID from the incoming headers, if there is one.
fn upstream_id(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_ID_LEN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request_with_id(id: &str) -> Request {
        axum::http::Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, id)
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[test]
    fn test_reuses_reasonable_upstream_ids() {
        let request = request_with_id("abc-123");
        assert_eq!(upstream_id(&request), Some("abc-123"));
    }

    #[test]
    fn test_rejects_empty_and_oversized_ids() {
        assert_eq!(upstream_id(&request_with_id("")), None);

        let long = "a".repeat(65);
        assert_eq!(upstream_id(&request_with_id(&long)), None);
    }
}
