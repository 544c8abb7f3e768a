//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters"))]
    pub name: String,
    /// Parent folder (None for root level).
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Visible to other owners.
    #[serde(default)]
    pub is_public: bool,
}

/// Rename request for a folder or a file.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub new_name: String,
}

/// Move request for a folder or a file. A null target means root level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MoveRequest {
    /// Destination folder.
    #[serde(default)]
    pub target_folder_id: Option<Uuid>,
}

/// Visibility change.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VisibilityRequest {
    /// New visibility.
    pub is_public: bool,
}

/// Folder patch, tagged by `op`:
///
/// ```json
/// { "op": "rename", "new_name": "Reports" }
/// { "op": "move", "target_folder_id": null }
/// { "op": "set_visibility", "is_public": true }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FolderPatchRequest {
    /// Rename the folder.
    Rename(RenameRequest),
    /// Reparent the folder.
    Move(MoveRequest),
    /// Change visibility.
    SetVisibility(VisibilityRequest),
}

impl Validate for FolderPatchRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Rename(req) => req.validate(),
            Self::Move(req) => req.validate(),
            Self::SetVisibility(req) => req.validate(),
        }
    }
}

/// File metadata patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FilePatchRequest {
    /// New display name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    /// New visibility.
    pub is_public: Option<bool>,
}

/// Query for `DELETE /folders/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteFolderQuery {
    /// Delete children too.
    #[serde(default)]
    pub recursive: bool,
}
