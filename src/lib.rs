pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Errors that stop the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Initialisation failed: {0}")]
    Core(#[from] core_state::CoreError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration, open the stores and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let config = config::AppConfig::from_env();
    tracing::info!(
        version = config::APP_VERSION,
        model = %config.model,
        database = %config.database_path.display(),
        remote_store = config.supabase.is_some(),
        proxy = config.api_base.as_deref().unwrap_or("none"),
        "{} starting",
        config::APP_NAME
    );
    if config.environment_key.is_none() {
        tracing::warn!("No GROQ_API_KEY set; the model is only reachable with a saved or per-request key");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let core = Arc::new(core_state::CoreState::from_config(config)?);
    let server = api::start_api_server(core, addr).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C, shutting down");
    }
    server.shutdown().await;
    Ok(())
}
