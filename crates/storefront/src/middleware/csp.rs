//! Per-request CSP nonces.
//!
//! The storefront has a handful of tiny inline scripts (flash auto-dismiss,
//! cart badge refresh). Rather than loosen the `Content-Security-Policy`,
//! each request mints a one-time nonce: templates stamp it on their
//! `<script>` tags and the security-headers layer quotes the same value in
//! the policy.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use rand::RngCore;

/// Random bytes behind each nonce. 18 bytes encodes to 24 base64 characters
/// with nothing to pad or escape in templates.
const NONCE_BYTES: usize = 18;

/// One request's inline-script nonce.
#[derive(Clone, Debug)]
pub struct CspNonce(pub String);

impl CspNonce {
    /// Mint a fresh random nonce.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD_NO_PAD.encode(bytes))
    }

    /// The base64 value, as templates and the CSP header want it.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Stash a fresh nonce in the request extensions.
///
/// Has to run before the security-headers layer, which reads the nonce back
/// out while building the `Content-Security-Policy` header.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::random());
    next.run(request).await
}

impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // An empty nonce fails closed: the browser refuses the inline
        // scripts instead of running unvetted ones.
        match parts.extensions.get::<Self>() {
            Some(nonce) => Ok(nonce.clone()),
            None => {
                tracing::warn!("request reached a handler without a CSP nonce");
                Ok(Self(String::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonces_are_unique_and_padding_free() {
        let a = CspNonce::random();
        let b = CspNonce::random();

        assert_ne!(a.value(), b.value());
        assert_eq!(a.value().len(), 24);
        assert!(!a.value().contains('='));
    }
}
