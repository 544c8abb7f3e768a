//! FileDeck Server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use filedeck_api::{AppState, serve};
use filedeck_core::config::AppConfig;
use filedeck_core::error::AppError;
use filedeck_core::traits::StorageProvider;
use filedeck_database::{DatabasePool, TreeRepository};
use filedeck_storage::LocalStorageProvider;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `default.toml`, the `FILEDECK_ENV` overlay, and `FILEDECK__*`
/// environment variables from `FILEDECK_CONFIG_DIR`.
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("FILEDECK_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("FILEDECK_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FileDeck v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;
    let repo: Arc<dyn TreeRepository> = Arc::new(db.tree_repository());

    tracing::info!(root = %config.storage.root_path, "Initializing local storage");
    let storage: Arc<dyn StorageProvider> =
        Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);

    let state = AppState::new(config, repo, storage);
    let result = serve(state).await;

    db.close().await;
    result
}
