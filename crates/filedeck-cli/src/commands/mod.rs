//! CLI command definitions and dispatch.

pub mod file;
pub mod folder;
pub mod health;
pub mod migrate;
pub mod upload;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use filedeck_client::ApiClient;
use filedeck_core::config::AppConfig;
use filedeck_core::error::AppError;

use crate::output::OutputFormat;

/// FileDeck: folders and files over HTTP
#[derive(Debug, Parser)]
#[command(name = "filedeck", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to load on top of the defaults
    #[arg(long, env = "FILEDECK_ENV", default_value = "development")]
    pub env: String,

    /// API base URL (overrides `client.base_url`)
    #[arg(long, env = "FILEDECK_URL")]
    pub url: Option<String>,

    /// Owner id to act as (overrides `client.owner_id`)
    #[arg(long, env = "FILEDECK_OWNER")]
    pub owner: Option<Uuid>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// More log output on stderr (-v info, -vv debug); `RUST_LOG` wins
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Browse and change folders
    Folder(folder::FolderArgs),
    /// Inspect and change files
    File(file::FileArgs),
    /// Upload local files, one at a time
    Upload(upload::UploadArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Check server health
    Health,
}

impl Cli {
    /// Log filter from `RUST_LOG`, falling back to the verbosity flag.
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(match self.verbose {
                0 => "warn",
                1 => "info",
                _ => "debug",
            })
        })
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config_dir, &self.env)?;

        match &self.command {
            Commands::Folder(args) => folder::execute(args, &self.client(&config)?, self.format).await,
            Commands::File(args) => file::execute(args, &self.client(&config)?, self.format).await,
            Commands::Upload(args) => upload::execute(args, &self.client(&config)?, &config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Health => health::execute(&self.client(&config)?, self.format).await,
        }
    }

    /// API client from configuration, with command-line overrides applied.
    fn client(&self, config: &AppConfig) -> Result<ApiClient, AppError> {
        let mut client_config = config.client.clone();
        if let Some(url) = &self.url {
            client_config.base_url = url.clone();
        }
        if let Some(owner) = self.owner {
            client_config.owner_id = Some(owner.to_string());
        }
        tracing::debug!(base_url = %client_config.base_url, "Connecting to FileDeck server");
        ApiClient::from_config(&client_config)
    }
}

/// Prints what a delete removed, and any stored objects left behind.
pub(crate) fn print_delete_report(report: &filedeck_client::DeleteReport, format: OutputFormat) {
    use crate::output;

    match format {
        OutputFormat::Json => output::print_json(report),
        OutputFormat::Table => {
            output::print_success(&format!(
                "Deleted {} folder(s) and {} file(s)",
                report.folders_deleted, report.files_deleted
            ));
            for failure in &report.storage_failures {
                output::print_warning(&format!(
                    "Stored object {} of file {} was not removed: {}",
                    failure.storage_path, failure.file_id, failure.message
                ));
            }
        }
    }
}
