//! Hardening headers for the dashboard.
//!
//! Tighter than the storefront: the dashboard serves no third-party assets
//! and no inline scripts, so every source list is `'self'` except product
//! thumbnails, which live on whatever CDN the platform hands back.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, header::CACHE_CONTROL},
    middleware::Next,
    response::Response,
};

/// Headers stamped on every response, static or dynamic.
const BASELINE: &[(&str, &str)] = &[
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    ("cross-origin-opener-policy", "same-origin"),
    ("x-dns-prefetch-control", "off"),
    (
        "content-security-policy",
        "default-src 'none'; \
         script-src 'self'; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' https: data:; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'; \
         upgrade-insecure-requests",
    ),
    (
        "permissions-policy",
        "accelerometer=(), camera=(), display-capture=(), geolocation=(), \
         gyroscope=(), magnetometer=(), microphone=(), midi=(), payment=(), \
         usb=(), xr-spatial-tracking=()",
    ),
];

/// Stamp the hardening headers onto the response.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let cacheable = request.uri().path().starts_with("/static");

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for &(name, value) in BASELINE {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    // Every page in the dashboard is behind a login; none of it may be
    // cached.
    if !cacheable {
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        );
    }

    response
}
