//! Hardening headers for every response.
//!
//! The set errs on the side of refusal: frames denied, referrers withheld,
//! sensitive browser features off, and a nonce-based script policy. Anything
//! the storefront later needs gets loosened deliberately, not by default.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{CACHE_CONTROL, CONTENT_SECURITY_POLICY},
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Headers stamped on every response, static or dynamic.
const BASELINE: &[(&str, &str)] = &[
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    ("cross-origin-opener-policy", "same-origin"),
    ("x-dns-prefetch-control", "off"),
    (
        "permissions-policy",
        "accelerometer=(), camera=(), display-capture=(), geolocation=(), \
         gyroscope=(), magnetometer=(), microphone=(), midi=(), payment=(), \
         usb=(), xr-spatial-tracking=()",
    ),
];

/// Script sources are the site itself, the htmx CDN, and inline snippets
/// carrying this request's nonce. Product images live on whatever CDN the
/// platform hands back, so `img-src` allows any https origin.
fn content_security_policy(nonce: &str) -> String {
    format!(
        "default-src 'none'; \
         script-src 'self' https://unpkg.com 'nonce-{nonce}'; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' https: data:; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'; \
         upgrade-insecure-requests"
    )
}

/// Stamp the hardening headers onto the response.
///
/// Runs inside the CSP-nonce layer so the policy can quote the nonce the
/// templates used for their inline scripts.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map_or_else(String::new, |nonce| nonce.value().to_string());
    let cacheable = request.uri().path().starts_with("/static");

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for &(name, value) in BASELINE {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    if let Ok(value) = HeaderValue::from_str(&content_security_policy(&nonce)) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }

    // Pages carry session state; static assets are the only thing browsers
    // may cache.
    if !cacheable {
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::content_security_policy;

    #[test]
    fn test_policy_quotes_the_request_nonce() {
        let policy = content_security_policy("abc123");

        assert!(policy.contains("'nonce-abc123'"));
        assert!(policy.contains("default-src 'none'"));
        assert!(policy.contains("form-action 'self'"));
    }
}
