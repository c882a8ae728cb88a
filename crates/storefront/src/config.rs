//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `QKART_API_URL` - QKart backend base URL
//!   (default: `https://qkart-joesunny99.herokuapp.com/api/v1`)
//! - `QKART_API_TIMEOUT_SECS` - Per-request timeout for backend calls (default: 10)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL; `https://` enables secure cookies
//!   (default: `http://localhost:3000`)
//! - `STOREFRONT_RATE_LIMIT` - Rate limit login/register submissions (default: true)
//! - `CATALOG_CACHE_TTL_SECS` - How long the product catalog is cached (default: 300)
//! - `SEARCH_DEBOUNCE_MS` - Search-as-you-type debounce window (default: 500)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default QKart backend endpoint.
pub const DEFAULT_API_URL: &str = "https://qkart-joesunny99.herokuapp.com/api/v1";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Whether auth form submissions are rate limited per client IP
    pub rate_limit: bool,
    /// QKart backend configuration
    pub api: ApiConfig,
    /// Search-as-you-type debounce window
    pub search_debounce: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// QKart REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative joins keep the path prefix
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Time-to-live of the cached product catalog
    pub catalog_ttl: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let rate_limit = parse_env_or_default("STOREFRONT_RATE_LIMIT", "true")?;
        let api = ApiConfig::from_env()?;
        let search_debounce =
            Duration::from_millis(parse_env_or_default("SEARCH_DEBOUNCE_MS", "500")?);

        Ok(Self {
            host,
            port,
            base_url,
            rate_limit,
            api,
            search_debounce,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("QKART_API_URL", DEFAULT_API_URL);
        let base_url = parse_api_url(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("QKART_API_URL".to_string(), e))?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(parse_env_or_default("QKART_API_TIMEOUT_SECS", "10")?),
            catalog_ttl: Duration::from_secs(parse_env_or_default(
                "CATALOG_CACHE_TTL_SECS",
                "300",
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the backend URL, normalising it to end with a slash.
///
/// `Url::join` replaces the last path segment unless the base ends in `/`,
/// which would turn `.../api/v1` + `products` into `.../api/products`.
///
/// # Errors
///
/// Returns a description of the problem if the URL does not parse or is not
/// `http`/`https`.
pub fn parse_api_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
