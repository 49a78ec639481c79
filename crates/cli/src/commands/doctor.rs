//! Validate configuration and backend reachability.

use tracing::{error, info};

use sokoni_backend::{Backend, BackendConfig};

/// Load the backend configuration and ping the store.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the backend is
/// unreachable.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = BackendConfig::from_env()?;
    info!(mode = config.mode(), "Backend configuration loaded");
    if let BackendConfig::Local { data_file } = &config {
        info!(path = %data_file.display(), exists = data_file.exists(), "Local data file");
    }

    let backend = config.connect().await?;
    match backend.ping().await {
        Ok(()) => {
            info!("Backend reachable");
            Ok(())
        }
        Err(e) => {
            error!("Backend unreachable: {e}");
            Err(e.into())
        }
    }
}
