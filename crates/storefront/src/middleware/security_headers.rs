//! Security headers for buyer-facing pages.
//!
//! The policy is locked down to same-origin resources plus the two things
//! a storefront needs beyond that: the per-request nonce for inline theme
//! styles and pixel bootstrap, and Facebook's pixel endpoints.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::CspNonce;

/// Build the storefront CSP for a nonce.
#[must_use]
pub fn content_security_policy(nonce: &str) -> String {
    format!(
        "default-src 'none'; \
         script-src 'self' 'nonce-{nonce}' https://connect.facebook.net; \
         style-src 'self' 'nonce-{nonce}'; \
         font-src 'self'; \
         img-src 'self' data: https://www.facebook.com; \
         connect-src 'self' https://www.facebook.com https://connect.facebook.net; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin` (pixel attribution needs the origin)
/// - `Content-Security-Policy` from [`content_security_policy`]
/// - `Permissions-Policy` denying sensors, camera and payment APIs
/// - `Cross-Origin-Opener-Policy: same-origin`
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_string())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if let Ok(csp) = HeaderValue::from_str(&content_security_policy(&nonce)) {
        headers.insert(CONTENT_SECURITY_POLICY, csp);
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             payment=(), \
             usb=()",
        ),
    );

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_allows_nonce_and_pixel() {
        let csp = content_security_policy("abc123==");
        assert!(csp.contains("script-src 'self' 'nonce-abc123==' https://connect.facebook.net;"));
        assert!(csp.contains("style-src 'self' 'nonce-abc123==';"));
        assert!(csp.contains("img-src 'self' data: https://www.facebook.com;"));
        assert!(!csp.contains("unsafe-inline"));
    }
}
