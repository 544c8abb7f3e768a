//! Server health check.

use filedeck_client::ApiClient;
use filedeck_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Execute the health command
pub async fn execute(client: &ApiClient, format: OutputFormat) -> Result<(), AppError> {
    let health = client.health().await?;

    match format {
        OutputFormat::Json => output::print_json(&health),
        OutputFormat::Table => {
            if health.status == "ok" {
                output::print_success(&format!("Server {} is healthy", health.version));
            } else {
                output::print_warning(&format!("Server {} is {}", health.version, health.status));
            }
            output::print_kv("database", &health.database);
            output::print_kv("storage", &health.storage);
        }
    }
    Ok(())
}
