//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DIGI_API_BASE_URL` - Base URL of the REST API (e.g. `http://localhost:3100/api/v1`)
//!
//! ## Optional
//! - `DIGI_STORAGE_DIR` - Directory backing the persisted key-value store (default: `.digi`)
//! - `DIGI_AUTH_PATH` - Path of the authentication screen (default: `/auth`)
//! - `DIGI_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `DIGI_CATALOG_CACHE_TTL_SECS` - Landing page cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_DIR: &str = ".digi";
const DEFAULT_AUTH_PATH: &str = "/auth";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL every API path is resolved against
    pub api_base_url: Url,
    /// Directory of the file-backed persisted store
    pub storage_dir: PathBuf,
    /// Path the recovery sequence navigates to
    pub auth_path: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// How long landing page and product lookups stay cached
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Configuration with defaults for everything but the API base URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

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
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_base = lookup("DIGI_API_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DIGI_API_BASE_URL".to_string()))?;
        let api_base_url = Url::parse(&raw_base).map_err(|e| {
            ConfigError::InvalidEnvVar("DIGI_API_BASE_URL".to_string(), e.to_string())
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "DIGI_API_BASE_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let auth_path = lookup("DIGI_AUTH_PATH").unwrap_or_else(|| DEFAULT_AUTH_PATH.to_string());
        if !auth_path.starts_with('/') {
            return Err(ConfigError::InvalidEnvVar(
                "DIGI_AUTH_PATH".to_string(),
                "must start with '/'".to_string(),
            ));
        }

        Ok(Self {
            api_base_url,
            storage_dir: lookup("DIGI_STORAGE_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from),
            auth_path,
            request_timeout: Duration::from_secs(parse_secs(
                &lookup,
                "DIGI_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            catalog_cache_ttl: Duration::from_secs(parse_secs(
                &lookup,
                "DIGI_CATALOG_CACHE_TTL_SECS",
                DEFAULT_CATALOG_CACHE_TTL_SECS,
            )?),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a whole number of seconds, falling back to `default` when unset.
fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    lookup(key).map_or(Ok(default), |raw| {
        raw.parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
