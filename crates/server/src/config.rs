//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ACCOUNTS_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; only required when `ACCOUNTS_STORE=postgres`)
//!
//! ## Optional
//! - `ACCOUNTS_STORE` - `postgres` (default) or `memory`
//! - `ACCOUNTS_HOST` - Bind address (default: 127.0.0.1)
//! - `ACCOUNTS_PORT` - Listen port (default: 8000)
//! - `ACCOUNTS_MIN_PASSWORD_LENGTH` - Minimum password length for signups (default: 6)
//! - `ACCOUNTS_ARGON2_MEMORY_KIB` - Argon2 memory cost (default: 19456)
//! - `ACCOUNTS_ARGON2_ITERATIONS` - Argon2 time cost (default: 2)
//! - `ACCOUNTS_ARGON2_PARALLELISM` - Argon2 lanes (default: 1)
//! - `ACCOUNTS_RATE_LIMIT` - Per-IP rate limit on `/users` routes (default: true)
//! - `ACCOUNTS_TRUST_PROXY_HEADERS` - Key the rate limit on `X-Forwarded-For` /
//!   `X-Real-IP` instead of the peer address; only set behind a reverse proxy
//!   that overwrites them (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use crate::services::auth::HashingParams;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which [`UserStore`](crate::db::UserStore) backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// `PostgreSQL` via sqlx.
    #[default]
    Postgres,
    /// Process memory; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{other}'")),
        }
    }
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct AccountsConfig {
    /// Storage backend
    pub store: StoreBackend,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Minimum password length accepted by the HTTP API
    pub min_password_length: usize,
    /// Argon2 cost parameters for new hashes
    pub hashing: HashingParams,
    /// Whether the `/users` routes are rate limited per client IP
    pub rate_limit: bool,
    /// Whether the rate limiter trusts client IP headers set by a reverse proxy
    pub trust_proxy_headers: bool,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN; Sentry is disabled when unset
    pub dsn: Option<String>,
    /// Environment tag (e.g. `production`)
    pub environment: Option<String>,
    /// Fraction of errors sent
    pub sample_rate: f32,
    /// Fraction of transactions traced
    pub traces_sample_rate: f32,
}

impl AccountsConfig {
    /// Default minimum password length.
    pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

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

        let store: StoreBackend = parse_env_or_default("ACCOUNTS_STORE", "postgres")?;
        let database_url = match store {
            StoreBackend::Postgres => Some(get_database_url("ACCOUNTS_DATABASE_URL")?),
            StoreBackend::Memory => None,
        };

        let defaults = HashingParams::default();
        let hashing = HashingParams {
            memory_kib: parse_env_or_default(
                "ACCOUNTS_ARGON2_MEMORY_KIB",
                &defaults.memory_kib.to_string(),
            )?,
            iterations: parse_env_or_default(
                "ACCOUNTS_ARGON2_ITERATIONS",
                &defaults.iterations.to_string(),
            )?,
            parallelism: parse_env_or_default(
                "ACCOUNTS_ARGON2_PARALLELISM",
                &defaults.parallelism.to_string(),
            )?,
        };

        let min_password_length: usize = parse_env_or_default(
            "ACCOUNTS_MIN_PASSWORD_LENGTH",
            &Self::DEFAULT_MIN_PASSWORD_LENGTH.to_string(),
        )?;
        if min_password_length == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ACCOUNTS_MIN_PASSWORD_LENGTH".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            store,
            database_url,
            host: parse_env_or_default("ACCOUNTS_HOST", "127.0.0.1")?,
            port: parse_env_or_default("ACCOUNTS_PORT", "8000")?,
            min_password_length,
            hashing,
            rate_limit: parse_bool_env("ACCOUNTS_RATE_LIMIT", true)?,
            trust_proxy_headers: parse_bool_env("ACCOUNTS_TRUST_PROXY_HEADERS", false)?,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Configuration for tests: in-memory store, cheap hashing, no rate limit.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            store: StoreBackend::Memory,
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            min_password_length: Self::DEFAULT_MIN_PASSWORD_LENGTH,
            hashing: HashingParams {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            },
            rate_limit: false,
            trust_proxy_headers: false,
            sentry: SentryConfig::default(),
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag, accepting `true/false`, `1/0`, `yes/no`, `on/off`.
fn parse_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    std::env::var(key).map_or(Ok(default), |raw| parse_bool(key, &raw))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}
