//! Persistence trait for the folder/file tree.

use async_trait::async_trait;
use uuid::Uuid;

use filedeck_core::result::AppResult;
use filedeck_entity::file::{CreateFile, File, FilePatch};
use filedeck_entity::folder::{CreateFolder, Folder, FolderPatch, TreeArena};

/// Which parent a listing is scoped to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentScope {
    /// Any parent.
    #[default]
    Any,
    /// Root level only.
    Root,
    /// Direct children of the given folder.
    In(Uuid),
}

impl ParentScope {
    /// Scope for an optional parent id.
    pub fn of(parent_id: Option<Uuid>) -> Self {
        parent_id.map_or(Self::Root, Self::In)
    }
}

/// Filter for folder listings.
#[derive(Debug, Clone, Default)]
pub struct FolderFilter {
    /// Restrict to one owner.
    pub owner_id: Option<Uuid>,
    /// Restrict to one parent.
    pub parent: ParentScope,
}

impl FolderFilter {
    /// Root-level folders of an owner.
    pub fn root_of(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
            parent: ParentScope::Root,
        }
    }

    /// Direct children of a folder.
    pub fn children_of(folder_id: Uuid) -> Self {
        Self {
            owner_id: None,
            parent: ParentScope::In(folder_id),
        }
    }
}

/// Filter for file listings.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    /// Restrict to one owner.
    pub owner_id: Option<Uuid>,
    /// Restrict to one containing folder.
    pub parent: ParentScope,
}

impl FileFilter {
    /// Root-level files of an owner.
    pub fn root_of(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
            parent: ParentScope::Root,
        }
    }

    /// Files directly in a folder.
    pub fn in_folder(folder_id: Uuid) -> Self {
        Self {
            owner_id: None,
            parent: ParentScope::In(folder_id),
        }
    }
}

/// Persistence for folders and files.
///
/// Implementations are the sole mutators of record state. Structural
/// writes (`insert_folder`, `update_folder`) run their checks and the
/// write as one atomic unit per owner:
///
/// - the parent / target folder must exist and belong to the same owner
///   (`NotFound` otherwise);
/// - the name must be unique among the owner's sibling folders
///   (`Conflict` otherwise);
/// - a reparent must not place a folder under itself or a descendant
///   (`InvalidOperation` otherwise).
///
/// Folder listings are sorted by name, file listings newest first.
#[async_trait]
pub trait TreeRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by ID.
    async fn find_folder(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// Find a file by ID.
    async fn find_file(&self, id: Uuid) -> AppResult<Option<File>>;

    /// List folders matching a filter.
    async fn find_folders(&self, filter: &FolderFilter) -> AppResult<Vec<Folder>>;

    /// List files matching a filter.
    async fn find_files(&self, filter: &FileFilter) -> AppResult<Vec<File>>;

    /// Direct (subfolder, file) counts of a folder.
    async fn child_counts(&self, folder_id: Uuid) -> AppResult<(u64, u64)>;

    /// Insert a folder.
    async fn insert_folder(&self, data: CreateFolder) -> AppResult<Folder>;

    /// Apply a patch to a folder.
    async fn update_folder(&self, id: Uuid, patch: FolderPatch) -> AppResult<Folder>;

    /// Delete a single folder record. The folder must have no children.
    ///
    /// Returns whether a record was removed.
    async fn delete_folder(&self, id: Uuid) -> AppResult<bool>;

    /// Insert a file record.
    async fn insert_file(&self, data: CreateFile) -> AppResult<File>;

    /// Apply a patch to a file. A new `folder_id` must resolve to a folder
    /// of the same owner.
    async fn update_file(&self, id: Uuid, patch: FilePatch) -> AppResult<File>;

    /// Delete a file record. Returns whether a record was removed.
    async fn delete_file(&self, id: Uuid) -> AppResult<bool>;

    /// Ancestor chain of a folder, nearest first, starting with the folder
    /// itself. Empty when the folder does not exist.
    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Folder>>;

    /// Load a folder with every descendant folder and file into an arena.
    /// Empty when the folder does not exist.
    async fn load_subtree(&self, id: Uuid) -> AppResult<TreeArena>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
