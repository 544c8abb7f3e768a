//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::FileKind;

/// A file stored in FileDeck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// Display name (including extension).
    pub name: String,
    /// The name the file was uploaded with.
    pub original_name: String,
    /// Content category.
    pub kind: FileKind,
    /// MIME type of the file.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// The path within the storage provider. Assigned once, never reused.
    pub storage_path: String,
    /// The containing folder (null for root-level files).
    pub folder_id: Option<Uuid>,
    /// The file owner.
    pub owner_id: Uuid,
    /// Whether other owners may read this file.
    pub is_public: bool,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }

    /// Whether `owner_id` may read this file.
    pub fn is_readable_by(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id || self.is_public
    }

    /// Human-readable size.
    pub fn size_display(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The folder to place the file in.
    pub folder_id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Uploaded name.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// The path within the storage provider.
    pub storage_path: String,
    /// The file owner.
    pub owner_id: Uuid,
    /// Visibility flag.
    pub is_public: bool,
}

impl CreateFile {
    /// Materialise the record with a fresh id and timestamps.
    pub fn into_file(self) -> File {
        let now = Utc::now();
        File {
            id: Uuid::new_v4(),
            kind: FileKind::from_mime(&self.mime_type),
            name: self.name,
            original_name: self.original_name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            storage_path: self.storage_path,
            folder_id: self.folder_id,
            owner_id: self.owner_id,
            is_public: self.is_public,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update to a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilePatch {
    /// New display name.
    pub name: Option<String>,
    /// New containing folder; `Some(None)` moves to root level.
    pub folder_id: Option<Option<Uuid>>,
    /// New visibility.
    pub is_public: Option<bool>,
}

impl FilePatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.folder_id.is_none() && self.is_public.is_none()
    }

    /// Apply the patch to a file in place and bump `updated_at`.
    pub fn apply(&self, file: &mut File) {
        if let Some(name) = &self.name {
            file.name = name.clone();
        }
        if let Some(folder_id) = self.folder_id {
            file.folder_id = folder_id;
        }
        if let Some(is_public) = self.is_public {
            file.is_public = is_public;
        }
        file.updated_at = Utc::now();
    }
}

/// Format a byte count as `N B`, `N.N KB`, `N.N MB` or `N.N GB`.
pub fn format_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < MB {
        format!("{:.1} KB", value / KB)
    } else if value < GB {
        format!("{:.1} MB", value / MB)
    } else {
        format!("{:.1} GB", value / GB)
    }
}
