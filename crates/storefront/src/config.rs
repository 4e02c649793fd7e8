//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `DASHBOARD_BASE_URL` - Public URL of the merchant dashboard (sign-up links)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `MEDIA_DIR` - Directory holding uploaded images (default: media)
//! - `MEDIA_BASE_URL` - URL prefix the media directory is served under (default: /media)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sampling (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront (no trailing slash)
    pub base_url: String,
    /// Public base URL of the merchant dashboard (no trailing slash)
    pub dashboard_url: String,
    /// Directory uploaded images are read from
    pub media_dir: PathBuf,
    /// URL prefix of uploaded images
    pub media_base_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;
        let base_url = get_base_url("STOREFRONT_BASE_URL")?;
        let dashboard_url = get_base_url("DASHBOARD_BASE_URL")?;
        let media_dir = PathBuf::from(get_env_or_default("MEDIA_DIR", "media"));
        let media_base_url = get_env_or_default("MEDIA_BASE_URL", "/media")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            dashboard_url,
            media_dir,
            media_base_url,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_optional_env("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Route the media directory is mounted at, when served locally.
    ///
    /// `None` when `MEDIA_BASE_URL` points at another host.
    #[must_use]
    pub fn media_route(&self) -> Option<&str> {
        Some(self.media_base_url.as_str()).filter(|url| url.starts_with('/') && url.len() > 1)
    }

    /// Absolute URL of a storefront path, for canonical links.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn get_base_url(key: &str) -> Result<String, ConfigError> {
    let raw = get_required_env(key)?;
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/converty"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            dashboard_url: "http://localhost:3001".to_string(),
            media_dir: PathBuf::from("media"),
            media_base_url: "/media".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_media_route() {
        let mut config = test_config();
        assert_eq!(config.media_route(), Some("/media"));

        config.media_base_url = "https://cdn.example.com/media".to_string();
        assert_eq!(config.media_route(), None);

        config.media_base_url = String::new();
        assert_eq!(config.media_route(), None);
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            test_config().absolute_url("/shop/tech-store"),
            "http://localhost:3000/shop/tech-store"
        );
    }
}
