//! Per-request correlation IDs for the dashboard.
//!
//! Every request gets an ID that shows up in the tracing span, in Sentry
//! tags, and in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// Header the ID is read from and echoed back on.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID we accept before minting our own.
const MAX_ID_LEN: usize = 64;

/// Attach a correlation ID to the request.
///
/// A reverse proxy may already have assigned one; reuse it so our logs line
/// up with its. Anything missing, unprintable, or oversized is replaced with
/// a fresh UUID v4.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        upstream_id(&request).map_or_else(|| Uuid::new_v4().to_string(), String::from);

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

    #[test]
    fn test_upstream_ids_are_bounded() {
        let request = |id: &str| {
            axum::http::Request::builder()
                .uri("/")
                .header(REQUEST_ID_HEADER, id)
                .body(axum::body::Body::empty())
                .unwrap()
        };

        assert_eq!(upstream_id(&request("req-9")), Some("req-9"));
        assert_eq!(upstream_id(&request("")), None);
        assert_eq!(upstream_id(&request(&"x".repeat(65))), None);
    }
}
