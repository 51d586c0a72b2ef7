pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod medicines;
pub mod models;
pub mod prescription;
pub mod search;
pub mod sellers;
pub mod stock;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Install the global tracing subscriber. `RUST_LOG` wins over the default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Prepare storage and serve the API until Ctrl-C.
pub async fn run(config: AppConfig) -> Result<(), String> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create data directory {}: {e}", parent.display()))?;
    }
    // Run migrations once up front so request connections find a current schema
    db::open_database_with_timeout(&config.db_path, config.busy_timeout)
        .map_err(|e| format!("Cannot open database {}: {e}", config.db_path.display()))?;
    tracing::info!(db_path = %config.db_path.display(), "Database ready");

    let ctx = api::ApiContext::new(&config);
    let mut server = api::start_api_server_on(ctx, config.bind_addr).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Cannot listen for shutdown signal: {e}"))?;

    server.shutdown();
    server.wait().await;
    Ok(())
}
