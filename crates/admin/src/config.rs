//! Admin panel configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Backend selection (see `sokoni-backend`)
//! - `SOKONI_BACKEND` / `SOKONI_BACKEND_URL` / `SOKONI_BACKEND_API_KEY` /
//!   `SOKONI_DATA_FILE`
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1; keep this on a
//!   private network, the panel has no auth of its own)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `SOKONI_CURRENCY` - Display currency code (default: UGX)
//! - `SENTRY_DSN` / `SENTRY_ENVIRONMENT` - Sentry error tracking

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use sokoni_backend::{BackendConfig, BackendConfigError};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error(transparent)]
    Backend(#[from] BackendConfigError),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Display currency code for table rendering
    pub currency: String,
    /// Which data backend this instance talks to
    pub backend: BackendConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = std::env::var("ADMIN_HOST")
            .unwrap_or_else(|_| "127.0.0.1".to_owned())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_owned(), e.to_string()))?;
        let port = std::env::var("ADMIN_PORT")
            .unwrap_or_else(|_| "3001".to_owned())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_owned(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            currency: std::env::var("SOKONI_CURRENCY").unwrap_or_else(|_| "UGX".to_owned()),
            backend: BackendConfig::from_env()?,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
