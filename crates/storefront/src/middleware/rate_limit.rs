//! Per-IP rate limiting for the abuse-prone routes.
//!
//! Two tiers, both backed by `tower_governor`: a strict one for the OTP
//! login endpoints and a looser one for the cart endpoints and the contact
//! form. Plain browsing is not limited at all.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers that can carry the real client address, most trustworthy
/// first. `X-Forwarded-For` may hold a hop chain; the first entry is the
/// client.
const CLIENT_IP_HEADERS: &[&str] = &[
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Keys the limiter by the client IP reported by the proxy in front of us.
///
/// Limiting by socket address would bucket every shopper behind the proxy
/// together, so a request with no usable header is rejected instead.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        CLIENT_IP_HEADERS
            .iter()
            .filter_map(|name| req.headers().get(*name))
            .filter_map(|value| value.to_str().ok())
            .filter_map(|raw| raw.split(',').next())
            .find_map(|candidate| candidate.trim().parse::<IpAddr>().ok())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// The governor layer the routers mount.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_secs: u64, burst: u32) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(replenish_secs)
        .burst_size(burst)
        .finish()
        .expect("positive rate limiter settings are always valid");
    GovernorLayer::new(Arc::new(config))
}

/// OTP endpoints: a burst of 5, then one request per 6 seconds per IP.
///
/// Keeps a single address from flooding a mailbox with one-time codes or
/// brute-forcing the verify step.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5)
}

/// Cart and contact endpoints: a burst of 50, then one request per second
/// per IP.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    limiter(1, 50)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_prefers_the_cloudflare_header() {
        let req = request(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("cf-connecting-ip", "198.51.100.7"),
        ]);

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "198.51.100.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_takes_the_first_hop_of_a_forwarded_chain() {
        let req = request(&[("x-forwarded-for", "203.0.113.9, 10.0.0.2, 10.0.0.3")]);

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_garbage_falls_through_to_the_next_header() {
        let req = request(&[
            ("cf-connecting-ip", "not-an-ip"),
            ("fly-client-ip", "192.0.2.44"),
        ]);

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "192.0.2.44".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_no_usable_header_is_an_error() {
        assert!(ClientIpKeyExtractor.extract(&request(&[])).is_err());
    }
}
