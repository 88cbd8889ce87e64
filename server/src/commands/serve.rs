use crate::config::ServerConfig;
use anyhow::{anyhow, Result};
use database::{initialize_database, DatabaseConfig};
use tracing::info;

/// Open the database and run the API until it stops
pub async fn execute(config: ServerConfig) -> Result<()> {
    info!("=== Parley starting ===");
    info!("Database path: {:?}", config.database_path);

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = initialize_database(
        DatabaseConfig::new().with_database_path(config.database_path.clone()),
    )
    .await?;

    api::start_server_with_config(db, config.api_config())
        .await
        .map_err(|e| anyhow!("API server error: {}", e))
}
