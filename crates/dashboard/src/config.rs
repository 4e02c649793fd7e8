//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DASHBOARD_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `DASHBOARD_BASE_URL` - Public URL for the merchant dashboard
//! - `STOREFRONT_BASE_URL` - Public URL of the storefront, used for "view shop" links
//!
//! ## Optional
//! - `DASHBOARD_HOST` - Bind address (default: 127.0.0.1)
//! - `DASHBOARD_PORT` - Listen port (default: 3001)
//! - `MEDIA_DIR` - Directory uploaded images are written to (default: media)
//! - `MEDIA_BASE_URL` - URL prefix the media directory is served under (default: /media)
//! - `MAX_UPLOAD_BYTES` - Largest accepted image file (default: 5 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sampling (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Dashboard application configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the dashboard (no trailing slash)
    pub base_url: String,
    /// Public base URL of the storefront (no trailing slash)
    pub storefront_url: String,
    /// Uploaded media settings
    pub media: MediaConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Where uploaded product images and theme assets live.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory on disk
    pub dir: PathBuf,
    /// URL prefix the directory is served under
    pub base_url: String,
    /// Maximum size of a single uploaded file
    pub max_upload_bytes: usize,
}

impl DashboardConfig {
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

        let database_url = get_database_url("DASHBOARD_DATABASE_URL")?;
        let host = get_env_or_default("DASHBOARD_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DASHBOARD_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_PORT".to_string(), e.to_string()))?;
        let base_url = get_base_url("DASHBOARD_BASE_URL")?;
        let storefront_url = get_base_url("STOREFRONT_BASE_URL")?;
        let media = MediaConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            storefront_url,
            media,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn uses_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Public storefront URL for a shop slug.
    #[must_use]
    pub fn shop_url(&self, slug: &str) -> String {
        format!("{}/shop/{slug}", self.storefront_url)
    }
}

impl MediaConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_upload_bytes = match get_optional_env("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                ConfigError::InvalidEnvVar("MAX_UPLOAD_BYTES".to_string(), e.to_string())
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            dir: PathBuf::from(get_env_or_default("MEDIA_DIR", "media")),
            base_url: get_env_or_default("MEDIA_BASE_URL", "/media")
                .trim_end_matches('/')
                .to_string(),
            max_upload_bytes,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get a required absolute http(s) URL, normalized without a trailing slash.
fn get_base_url(key: &str) -> Result<String, ConfigError> {
    let raw = get_required_env(key)?;
    normalize_base_url(&raw).map_err(|reason| ConfigError::InvalidEnvVar(key.to_string(), reason))
}

fn normalize_base_url(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn test_config() -> DashboardConfig {
        DashboardConfig {
            database_url: SecretString::from("postgres://localhost/converty"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            storefront_url: "http://localhost:3000".to_string(),
            media: MediaConfig {
                dir: PathBuf::from("media"),
                base_url: "/media".to_string(),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_shop_url() {
        assert_eq!(
            test_config().shop_url("tech-store"),
            "http://localhost:3000/shop/tech-store"
        );
    }

    #[test]
    fn test_uses_https() {
        let mut config = test_config();
        assert!(!config.uses_https());
        config.base_url = "https://dashboard.converty.app".to_string();
        assert!(config.uses_https());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://shop.example.com/").unwrap(),
            "https://shop.example.com"
        );
        assert_eq!(
            normalize_base_url(" http://localhost:3000 ").unwrap(),
            "http://localhost:3000"
        );
        assert!(normalize_base_url("ftp://example.com").is_err());
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let debug_output = format!("{:?}", test_config());
        assert!(!debug_output.contains("postgres://localhost/converty"));
        assert_eq!(
            test_config().database_url.expose_secret(),
            "postgres://localhost/converty"
        );
    }
}
