//! Per-request CSP nonce.
//!
//! Storefront pages inline two things: the shop's theme variables in a
//! `<style>` element and the Facebook Pixel bootstrap in a `<script>`
//! element. Both carry this nonce, and the CSP header built by
//! [`security_headers_middleware`](super::security_headers_middleware)
//! allows exactly that nonce.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// 128-bit random nonce, base64-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Generate a nonce and store it in the request extensions.
///
/// Must wrap `security_headers_middleware` so the nonce exists when the
/// CSP header is built on the way out.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!("CSP nonce missing from request extensions; inline code will be blocked");
            Self(String::new())
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_is_random_base64() {
        let a = CspNonce::generate();
        let b = CspNonce::generate();
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(a.value()).unwrap().len(), 16);
    }
}
