//! Backend selection.
//!
//! Which store a binary talks to is decided here, from environment
//! variables, once, at startup - handlers only ever see the [`Backend`]
//! trait.
//!
//! # Environment Variables
//!
//! - `SOKONI_BACKEND` - `remote`, `local`, or `memory` (default: `local`)
//! - `SOKONI_BACKEND_URL` - document API base URL (remote only, required)
//! - `SOKONI_BACKEND_API_KEY` - document API key (remote only, required)
//! - `SOKONI_BACKEND_POLL_MS` - change-poll interval (remote, default 2000)
//! - `SOKONI_DATA_FILE` - demo data file path (local, default `data/sokoni.json`)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::local::LocalBackend;
use crate::memory::MemoryBackend;
use crate::remote::{DEFAULT_POLL_INTERVAL, RemoteBackend};
use crate::store::{Backend, StoreError};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum BackendConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Unknown backend mode '{0}' (expected remote, local, or memory)")]
    UnknownMode(String),
}

/// Connection settings for the hosted document API.
#[derive(Clone)]
pub struct RemoteConfig {
    /// Document API base URL.
    pub base_url: String,
    /// API key, sent as a bearer token.
    pub api_key: SecretString,
    /// Interval between change polls for watched documents.
    pub poll_interval: Duration,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Which backend a binary connects to.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Hosted document API.
    Remote(RemoteConfig),
    /// JSON data file on disk (demo mode).
    Local {
        /// Path to the data file.
        data_file: PathBuf,
    },
    /// In-process only; state dies with the process.
    Memory,
}

impl BackendConfig {
    /// Load the backend selection from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `BackendConfigError` if the mode is unknown or the selected
    /// mode is missing a required variable.
    pub fn from_env() -> Result<Self, BackendConfigError> {
        let mode = std::env::var("SOKONI_BACKEND").unwrap_or_else(|_| "local".to_owned());
        match mode.as_str() {
            "remote" => {
                let base_url = std::env::var("SOKONI_BACKEND_URL").map_err(|_| {
                    BackendConfigError::MissingEnvVar("SOKONI_BACKEND_URL".to_owned())
                })?;
                let api_key = std::env::var("SOKONI_BACKEND_API_KEY").map(SecretString::from)
                    .map_err(|_| {
                        BackendConfigError::MissingEnvVar("SOKONI_BACKEND_API_KEY".to_owned())
                    })?;
                let poll_interval = match std::env::var("SOKONI_BACKEND_POLL_MS") {
                    Ok(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|e| {
                        BackendConfigError::InvalidEnvVar(
                            "SOKONI_BACKEND_POLL_MS".to_owned(),
                            e.to_string(),
                        )
                    })?),
                    Err(_) => DEFAULT_POLL_INTERVAL,
                };
                Ok(Self::Remote(RemoteConfig {
                    base_url,
                    api_key,
                    poll_interval,
                }))
            }
            "local" => {
                let data_file = std::env::var("SOKONI_DATA_FILE")
                    .map_or_else(|_| PathBuf::from("data/sokoni.json"), PathBuf::from);
                Ok(Self::Local { data_file })
            }
            "memory" => Ok(Self::Memory),
            other => Err(BackendConfigError::UnknownMode(other.to_owned())),
        }
    }

    /// Human-readable name for logs.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote",
            Self::Local { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Connect the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the local data file cannot be opened.
    pub async fn connect(&self) -> Result<Arc<dyn Backend>, StoreError> {
        match self {
            Self::Remote(config) => Ok(Arc::new(RemoteBackend::new(config))),
            Self::Local { data_file } => Ok(Arc::new(LocalBackend::open(data_file).await?)),
            Self::Memory => Ok(Arc::new(MemoryBackend::new())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_debug_redacts_api_key() {
        let config = RemoteConfig {
            base_url: "https://api.sokoni.app".to_owned(),
            api_key: SecretString::from("super-secret-api-key"),
            poll_interval: DEFAULT_POLL_INTERVAL,
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("https://api.sokoni.app"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-api-key"));
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(BackendConfig::Memory.mode(), "memory");
        assert_eq!(
            BackendConfig::Local {
                data_file: PathBuf::from("x.json")
            }
            .mode(),
            "local"
        );
    }
}
