//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//! 4. CSP nonce (generate per-request nonce for inline theme and pixel code)
//! 5. Security headers (CSP built from the nonce)
//! 6. Rate limiting on checkout posts (governor)

pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::checkout_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
