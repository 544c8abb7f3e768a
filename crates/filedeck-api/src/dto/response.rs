//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filedeck_entity::file::{File, FileKind};
use filedeck_entity::folder::Folder;
use filedeck_service::folder::{FolderListing, RootListing};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// File metadata as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: Uuid,
    pub name: String,
    pub original_name: String,
    pub kind: FileKind,
    pub mime_type: String,
    pub size_bytes: i64,
    /// Human-readable size, e.g. `1.5 MB`.
    pub size_display: String,
    pub folder_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<File> for FileResponse {
    fn from(file: File) -> Self {
        Self {
            size_display: file.size_display(),
            id: file.id,
            name: file.name,
            original_name: file.original_name,
            kind: file.kind,
            mime_type: file.mime_type,
            size_bytes: file.size_bytes,
            folder_id: file.folder_id,
            owner_id: file.owner_id,
            is_public: file.is_public,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

/// Root level of an owner's tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootListingResponse {
    pub folders: Vec<Folder>,
    pub files: Vec<FileResponse>,
}

impl From<RootListing> for RootListingResponse {
    fn from(listing: RootListing) -> Self {
        Self {
            folders: listing.folders,
            files: listing.files.into_iter().map(FileResponse::from).collect(),
        }
    }
}

/// A folder with its direct children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderListingResponse {
    pub folder: Folder,
    pub subfolders: Vec<Folder>,
    pub files: Vec<FileResponse>,
}

impl From<FolderListing> for FolderListingResponse {
    fn from(listing: FolderListing) -> Self {
        Self {
            folder: listing.folder,
            subfolders: listing.subfolders,
            files: listing.files.into_iter().map(FileResponse::from).collect(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database reachability.
    pub database: String,
    /// Storage reachability.
    pub storage: String,
}
