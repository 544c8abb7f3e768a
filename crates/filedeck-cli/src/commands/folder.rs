//! Folder management CLI commands.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use filedeck_client::{ApiClient, FileInfo};
use filedeck_core::error::{AppError, ErrorKind};
use filedeck_entity::folder::{Folder, FolderNode};

use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List a folder's contents, or the root level
    List {
        /// Folder ID (omit for root)
        id: Option<Uuid>,
    },
    /// Create a new folder
    Create {
        /// Folder name
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent: Option<Uuid>,
        /// Make the folder readable by other owners
        #[arg(long)]
        public: bool,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: Uuid,
        /// New name
        new_name: String,
    },
    /// Move a folder under another folder
    Move {
        /// Folder ID
        id: Uuid,
        /// Target folder ID (omit for root)
        #[arg(short, long)]
        to: Option<Uuid>,
    },
    /// Delete a folder
    Delete {
        /// Folder ID
        id: Uuid,
        /// Delete all contents too
        #[arg(short, long)]
        recursive: bool,
        /// Do not ask before deleting a non-empty folder
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the folder tree below a folder
    Tree {
        /// Folder ID
        id: Uuid,
    },
    /// Show the path from the root to a folder
    Path {
        /// Folder ID
        id: Uuid,
    },
    /// Change who can read a folder
    Visibility {
        /// Folder ID
        id: Uuid,
        /// New visibility
        #[arg(value_enum)]
        level: Visibility,
    },
}

/// Folder visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Visibility {
    /// Readable by every owner
    Public,
    /// Readable by the owner only
    Private,
}

/// One line of a listing
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// `dir` or `file`
    #[tabled(rename = "type")]
    kind: &'static str,
    /// ID
    id: String,
    /// Name
    name: String,
    /// Size
    size: String,
    /// Visibility
    public: bool,
    /// Last update
    updated: String,
}

impl EntryRow {
    fn folder(f: &Folder) -> Self {
        Self {
            kind: "dir",
            id: f.id.to_string(),
            name: f.name.clone(),
            size: "-".to_string(),
            public: f.is_public,
            updated: f.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }

    fn file(f: &FileInfo) -> Self {
        Self {
            kind: "file",
            id: f.id.to_string(),
            name: f.name.clone(),
            size: f.size_display.clone(),
            public: f.is_public,
            updated: f.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    client: &ApiClient,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FolderCommand::List { id } => {
            let (folders, files) = match id {
                Some(id) => {
                    let contents = client.list_folder(*id).await?;
                    (contents.subfolders, contents.files)
                }
                None => {
                    let contents = client.list_root().await?;
                    (contents.folders, contents.files)
                }
            };

            let rows: Vec<EntryRow> = folders
                .iter()
                .map(EntryRow::folder)
                .chain(files.iter().map(EntryRow::file))
                .collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Create {
            name,
            parent,
            public,
        } => {
            let folder = client.create_folder(name, *parent, *public).await?;
            print_folder(&folder, format, &format!("Folder '{}' created", folder.name));
        }
        FolderCommand::Rename { id, new_name } => {
            let folder = client.rename_folder(*id, new_name).await?;
            print_folder(&folder, format, &format!("Folder renamed to '{}'", folder.name));
        }
        FolderCommand::Move { id, to } => {
            let folder = client.move_folder(*id, *to).await?;
            let target = to.map_or_else(|| "root".to_string(), |t| t.to_string());
            print_folder(&folder, format, &format!("Folder '{}' moved to {}", folder.name, target));
        }
        FolderCommand::Delete { id, recursive, yes } => {
            let report = match client.delete_folder(*id, *recursive).await {
                Ok(report) => report,
                Err(e) if e.kind == ErrorKind::NotEmpty => {
                    let subfolders = e.detail_u64("subfolder_count").unwrap_or(0);
                    let files = e.detail_u64("file_count").unwrap_or(0);
                    if !*yes && !confirm_recursive(subfolders, files)? {
                        println!("Cancelled.");
                        return Ok(());
                    }
                    client.delete_folder(*id, true).await?
                }
                Err(e) => return Err(e),
            };
            super::print_delete_report(&report, format);
        }
        FolderCommand::Tree { id } => {
            let tree = client.tree(*id).await?;
            match format {
                OutputFormat::Json => output::print_json(&tree),
                OutputFormat::Table => print_tree(&tree),
            }
        }
        FolderCommand::Path { id } => {
            let chain = client.breadcrumbs(*id).await?;
            match format {
                OutputFormat::Json => output::print_json(&chain),
                OutputFormat::Table => {
                    let names: Vec<&str> = chain.iter().map(|f| f.name.as_str()).collect();
                    println!("/{}", names.join("/"));
                }
            }
        }
        FolderCommand::Visibility { id, level } => {
            let folder = client
                .set_folder_visibility(*id, *level == Visibility::Public)
                .await?;
            let label = if folder.is_public { "public" } else { "private" };
            print_folder(&folder, format, &format!("Folder '{}' is now {}", folder.name, label));
        }
    }

    Ok(())
}

fn confirm_recursive(subfolders: u64, files: u64) -> Result<bool, AppError> {
    dialoguer::Confirm::new()
        .with_prompt(format!(
            "Folder contains {subfolders} subfolder(s) and {files} file(s). Delete everything?"
        ))
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

fn print_folder(folder: &Folder, format: OutputFormat, message: &str) {
    match format {
        OutputFormat::Json => output::print_json(folder),
        OutputFormat::Table => {
            output::print_success(message);
            output::print_kv("id", &folder.id.to_string());
            output::print_kv(
                "parent",
                &folder
                    .parent_id
                    .map_or_else(|| "(root)".to_string(), |p| p.to_string()),
            );
        }
    }
}

fn print_tree(root: &FolderNode) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        println!(
            "{}{}/  ({} files)",
            "  ".repeat(node.depth as usize),
            node.name,
            node.file_count
        );
        stack.extend(node.children.iter().rev());
    }
}
