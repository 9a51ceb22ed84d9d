//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `XAUDI_HOST` - Bind address (default: 127.0.0.1)
//! - `XAUDI_PORT` - Listen port (default: 3000)
//! - `XAUDI_DATA_DIR` - Directory for server-side data (default: `data`)
//! - `XAUDI_PRODUCTS_FILE` - Product feed file (default: `<data dir>/products.json`)
//! - `XAUDI_UPLOAD_DIR` - Uploaded assets (default: `<data dir>/uploads`)
//! - `XAUDI_MAX_UPLOAD_BYTES` - Request body limit for uploads (default: 25 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

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
    /// Root of server-side data
    pub data_dir: PathBuf,
    /// JSON file holding uploaded product records
    pub products_file: PathBuf,
    /// Directory uploaded files are written to and served from
    pub upload_dir: PathBuf,
    /// Maximum accepted request body size
    pub max_upload_bytes: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = parse_var("XAUDI_HOST", &get_or("XAUDI_HOST", "127.0.0.1"))?;
        let port = parse_var("XAUDI_PORT", &get_or("XAUDI_PORT", "3000"))?;
        let data_dir = PathBuf::from(get_or("XAUDI_DATA_DIR", "data"));
        let products_file = lookup("XAUDI_PRODUCTS_FILE")
            .map_or_else(|| data_dir.join("products.json"), PathBuf::from);
        let upload_dir =
            lookup("XAUDI_UPLOAD_DIR").map_or_else(|| data_dir.join("uploads"), PathBuf::from);
        let max_upload_bytes = lookup("XAUDI_MAX_UPLOAD_BYTES")
            .map(|v| parse_var("XAUDI_MAX_UPLOAD_BYTES", &v))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let sentry_sample_rate =
            parse_rate("SENTRY_SAMPLE_RATE", lookup("SENTRY_SAMPLE_RATE"), 1.0)?;
        let sentry_traces_sample_rate =
            parse_rate("SENTRY_TRACES_SAMPLE_RATE", lookup("SENTRY_TRACES_SAMPLE_RATE"), 0.0)?;

        Ok(Self {
            host,
            port,
            data_dir,
            products_file,
            upload_dir,
            max_upload_bytes,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration rooted at `data_dir` with every other value defaulted.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            products_file: data_dir.join("products.json"),
            upload_dir: data_dir.join("uploads"),
            data_dir,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable's value, naming the variable on failure.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional sample rate in `[0.0, 1.0]`.
fn parse_rate(key: &str, value: Option<String>, default: f32) -> Result<f32, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let rate: f32 = parse_var(key, &value)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}
