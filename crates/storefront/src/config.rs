//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `HARDALUM_ENV` - `development` (default) or `production`
//! - `HARDALUM_API_URL` - Base URL of the storefront API (default depends on
//!   `HARDALUM_ENV`: `http://localhost:5000` or the production backend)
//! - `HARDALUM_DATA_DIR` - Directory for the durable client-side store
//!   (default: `.hardalum`)
//! - `HARDALUM_SHIPPING_FLAT_RATE` - Flat shipping surcharge (default: 15.00)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use hardalum_core::Price;
use thiserror::Error;
use url::Url;

/// API used when running against a local backend.
pub const DEVELOPMENT_API_URL: &str = "http://localhost:5000";

/// API used by production builds.
pub const PRODUCTION_API_URL: &str = "https://hardalum-backend-production.up.railway.app";

const DEFAULT_DATA_DIR: &str = ".hardalum";
const DEFAULT_SHIPPING_FLAT_RATE: &str = "15.00";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvVar(
                "HARDALUM_ENV".to_string(),
                format!("unknown environment '{other}'"),
            )),
        }
    }

    /// API base URL used when `HARDALUM_API_URL` is not set.
    #[must_use]
    pub const fn default_api_url(self) -> &'static str {
        match self {
            Self::Development => DEVELOPMENT_API_URL,
            Self::Production => PRODUCTION_API_URL,
        }
    }
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Base URL of the remote storefront API
    pub api_base_url: Url,
    /// Directory holding the durable key-value store
    pub data_dir: PathBuf,
    /// Flat shipping surcharge applied to non-empty carts
    pub shipping_flat_rate: Price,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("HARDALUM_ENV")
            .map(|value| Environment::parse(&value))
            .transpose()?
            .unwrap_or_default();

        let api_base_url = lookup("HARDALUM_API_URL")
            .unwrap_or_else(|| environment.default_api_url().to_string());
        let api_base_url = parse_base_url(&api_base_url)?;

        let data_dir = lookup("HARDALUM_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let shipping_flat_rate = lookup("HARDALUM_SHIPPING_FLAT_RATE")
            .unwrap_or_else(|| DEFAULT_SHIPPING_FLAT_RATE.to_string())
            .parse::<Price>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("HARDALUM_SHIPPING_FLAT_RATE".to_string(), e.to_string())
            })?;

        Ok(Self {
            environment,
            api_base_url,
            data_dir,
            shipping_flat_rate,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for a local backend with an explicit data directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base_url` is not an http(s) URL.
    pub fn local(api_base_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::Development,
            api_base_url: parse_base_url(api_base_url)?,
            data_dir: data_dir.into(),
            shipping_flat_rate: Price::from_cents(1500),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

/// Parse an API base URL, requiring an http(s) scheme.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("HARDALUM_API_URL".to_string(), e.to_string())
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "HARDALUM_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(with_trailing_slash(url))
}

/// Make `url` a directory so relative endpoint paths join under it.
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
