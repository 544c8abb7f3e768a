//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder in the file hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Folder name, unique among siblings of the same owner.
    pub name: String,
    /// Parent folder ID (null for root-level folders).
    pub parent_id: Option<Uuid>,
    /// The folder owner.
    pub owner_id: Uuid,
    /// Whether other owners may read this folder.
    pub is_public: bool,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root-level folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether `owner_id` may read this folder.
    pub fn is_readable_by(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id || self.is_public
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// Parent folder (None for root level).
    pub parent_id: Option<Uuid>,
    /// The folder owner.
    pub owner_id: Uuid,
    /// Visibility flag.
    pub is_public: bool,
}

/// A partial update to a folder.
///
/// `parent_id` is doubly optional: `None` leaves the parent alone,
/// `Some(None)` moves the folder to root level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderPatch {
    /// New name.
    pub name: Option<String>,
    /// New parent.
    pub parent_id: Option<Option<Uuid>>,
    /// New visibility.
    pub is_public: Option<bool>,
}

impl FolderPatch {
    /// A rename-only patch.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A move-only patch.
    pub fn reparent(parent_id: Option<Uuid>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    /// Whether applying this patch changes the sibling set or the name.
    pub fn touches_placement(&self) -> bool {
        self.name.is_some() || self.parent_id.is_some()
    }

    /// Apply the patch to a folder in place and bump `updated_at`.
    pub fn apply(&self, folder: &mut Folder) {
        if let Some(name) = &self.name {
            folder.name = name.clone();
        }
        if let Some(parent_id) = self.parent_id {
            folder.parent_id = parent_id;
        }
        if let Some(is_public) = self.is_public {
            folder.is_public = is_public;
        }
        folder.updated_at = Utc::now();
    }
}
