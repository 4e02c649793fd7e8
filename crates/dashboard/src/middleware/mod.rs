//! HTTP middleware stack for the dashboard.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on `/auth` form posts
//!
//! Route-level authentication uses the [`RequireMerchant`] and
//! [`ShopSession`] extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, RequireMerchant, ShopSession, clear_current_merchant, set_current_merchant,
};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
