//! File management CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use uuid::Uuid;

use filedeck_client::{ApiClient, FileInfo};
use filedeck_core::error::{AppError, ErrorKind};

use crate::output::{self, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Show file metadata
    Info {
        /// File ID
        id: Uuid,
    },
    /// Rename a file
    Rename {
        /// File ID
        id: Uuid,
        /// New name
        new_name: String,
    },
    /// Move a file into a folder
    Move {
        /// File ID
        id: Uuid,
        /// Target folder ID (omit for root)
        #[arg(short, long)]
        to: Option<Uuid>,
    },
    /// Make a file readable by other owners, or private again
    Publish {
        /// File ID
        id: Uuid,
        /// Make the file private instead
        #[arg(long)]
        off: bool,
    },
    /// Delete a file
    Delete {
        /// File ID
        id: Uuid,
    },
    /// Download file content
    Download {
        /// File ID
        id: Uuid,
        /// Output path (defaults to the file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Execute file commands
pub async fn execute(
    args: &FileArgs,
    client: &ApiClient,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FileCommand::Info { id } => {
            let file = client.get_file(*id).await?;
            print_file(&file, format);
        }
        FileCommand::Rename { id, new_name } => {
            let file = client.rename_file(*id, new_name).await?;
            print_file(&file, format);
        }
        FileCommand::Move { id, to } => {
            let file = client.move_file(*id, *to).await?;
            print_file(&file, format);
        }
        FileCommand::Publish { id, off } => {
            let file = client.set_file_visibility(*id, !*off).await?;
            print_file(&file, format);
        }
        FileCommand::Delete { id } => {
            let report = client.delete_file(*id).await?;
            super::print_delete_report(&report, format);
        }
        FileCommand::Download { id, output: path } => {
            let file = client.get_file(*id).await?;
            let data = client.download(*id).await?;
            let path = path.clone().unwrap_or_else(|| PathBuf::from(&file.name));

            tokio::fs::write(&path, &data).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write {}", path.display()),
                    e,
                )
            })?;
            output::print_success(&format!(
                "Saved '{}' ({}) to {}",
                file.name,
                file.size_display,
                path.display()
            ));
        }
    }

    Ok(())
}

fn print_file(file: &FileInfo, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(file),
        OutputFormat::Table => {
            output::print_kv("id", &file.id.to_string());
            output::print_kv("name", &file.name);
            output::print_kv("original name", &file.original_name);
            output::print_kv("kind", &file.kind.to_string());
            output::print_kv("type", &file.mime_type);
            output::print_kv("size", &file.size_display);
            output::print_kv(
                "folder",
                &file
                    .folder_id
                    .map_or_else(|| "(root)".to_string(), |f| f.to_string()),
            );
            output::print_kv("public", &file.is_public.to_string());
            output::print_kv("updated", &file.updated_at.to_rfc3339());
        }
    }
}
