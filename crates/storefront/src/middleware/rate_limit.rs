//! Rate limiting for checkout submissions using governor and `tower_governor`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor for the buyer's IP behind Cloudflare and Fly.io.
///
/// Falls back to the socket peer address when no proxy header is present.
#[derive(Clone, Copy)]
pub struct BuyerIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for BuyerIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        // Cloudflare's real client IP
        if let Some(ip) = header_ip(req, "cf-connecting-ip") {
            return Ok(ip);
        }

        // First hop of X-Forwarded-For
        if let Some(ip) = header_ip(req, "x-forwarded-for") {
            return Ok(ip);
        }

        if let Some(ip) = header_ip(req, "x-real-ip") {
            return Ok(ip);
        }

        if let Some(ip) = header_ip(req, "fly-client-ip") {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<BuyerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for checkout posts: ~30 orders per minute per IP, burst of 10.
///
/// # Panics
///
/// Never panics: `per_second(2)` and `burst_size(10)` are valid positive values.
#[must_use]
#[allow(clippy::expect_used)]
pub fn checkout_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(BuyerIpKeyExtractor)
        .per_second(2)
        .burst_size(10)
        .finish()
        .expect("rate limiter config with per_second(2) and burst_size(10) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/shop/tech-store/product/x/checkout");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_header_precedence() {
        let req = request(&[
            ("fly-client-ip", "192.0.2.9"),
            ("x-real-ip", "192.0.2.8"),
            ("x-forwarded-for", "198.51.100.4, 10.0.0.2"),
        ]);
        let ip = BuyerIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "198.51.100.4");
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = request(&[("x-forwarded-for", "not-an-ip")]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([203, 0, 113, 5], 50000))));
        let ip = BuyerIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "203.0.113.5");
    }

    #[test]
    fn test_no_ip_is_an_error() {
        assert!(BuyerIpKeyExtractor.extract(&request(&[])).is_err());
    }
}
