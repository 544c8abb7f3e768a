//! File upload CLI command.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use filedeck_client::{
    ApiClient, TransferCoordinator, TransferEvent, TransferOptions, TransferStatus, UploadSource,
};
use filedeck_core::config::AppConfig;
use filedeck_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Files to upload, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Target folder ID (omit for root)
    #[arg(short, long)]
    pub folder: Option<Uuid>,
}

/// Upload result row
#[derive(Debug, Serialize, Tabled)]
struct UploadRow {
    /// File name
    name: String,
    /// Final status
    status: String,
    /// Created file ID, or the failure message
    result: String,
}

/// Execute the upload command
pub async fn execute(
    args: &UploadArgs,
    client: &ApiClient,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        sources.push(UploadSource::from_path(path).await?);
    }

    let coordinator = TransferCoordinator::new(
        Arc::new(client.clone()),
        TransferOptions::from_config(&config.client, args.folder),
    );

    let names: HashMap<String, String> = {
        let names: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
        coordinator.enqueue(sources).into_iter().zip(names).collect()
    };

    let printer = (format == OutputFormat::Table).then(|| {
        let mut events = coordinator.subscribe();
        let names = names.clone();
        tokio::spawn(async move {
            let name = |id: &str| names.get(id).cloned().unwrap_or_else(|| id.to_string());
            loop {
                match events.recv().await {
                    Ok(TransferEvent::Progress { id, percent }) => {
                        print!("\r  {:<40} {:>3}%", name(&id), percent);
                        let _ = std::io::stdout().flush();
                    }
                    Ok(TransferEvent::Succeeded { id, .. }) => {
                        println!("\r  {:<40} done", name(&id));
                    }
                    Ok(TransferEvent::Failed { id, error }) => {
                        println!("\r  {:<40} failed: {}", name(&id), error);
                    }
                    Ok(TransferEvent::Idle) | Err(RecvError::Closed) => break,
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                }
            }
        })
    });

    let report = coordinator.start().await;
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    let rows: Vec<UploadRow> = coordinator
        .snapshot()
        .into_iter()
        .map(|item| UploadRow {
            name: item.name,
            status: match item.status {
                TransferStatus::Success => "uploaded",
                TransferStatus::Error => "failed",
                TransferStatus::Pending => "pending",
                TransferStatus::Uploading => "uploading",
            }
            .to_string(),
            result: item
                .file_id
                .map(|id| id.to_string())
                .or(item.error)
                .unwrap_or_default(),
        })
        .collect();
    output::print_list(&rows, format);

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(AppError::storage(format!(
            "{} of {} uploads failed",
            report.failed.len(),
            report.failed.len() + report.succeeded.len()
        )))
    }
}
