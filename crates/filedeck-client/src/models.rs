//! Response shapes returned by the FileDeck API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filedeck_entity::file::FileKind;
use filedeck_entity::folder::Folder;

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Error body: `{ "error", "message", "details"? }`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// File metadata as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: Uuid,
    pub name: String,
    pub original_name: String,
    pub kind: FileKind,
    pub mime_type: String,
    pub size_bytes: i64,
    pub size_display: String,
    pub folder_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Root level of the caller's tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootContents {
    pub folders: Vec<Folder>,
    pub files: Vec<FileInfo>,
}

/// A folder with its direct children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderContents {
    pub folder: Folder,
    pub subfolders: Vec<Folder>,
    pub files: Vec<FileInfo>,
}

/// A stored object that could not be removed during a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageFailureInfo {
    pub file_id: Uuid,
    pub storage_path: String,
    pub message: String,
}

/// Result of a file or folder delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub folders_deleted: u64,
    pub files_deleted: u64,
    #[serde(default)]
    pub storage_failures: Vec<StorageFailureInfo>,
}

impl DeleteReport {
    /// Whether every stored object was removed too.
    pub fn is_complete(&self) -> bool {
        self.storage_failures.is_empty()
    }
}

/// Server health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthInfo {
    pub status: String,
    pub version: String,
    pub database: String,
    pub storage: String,
}
