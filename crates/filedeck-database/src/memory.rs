//! In-memory tree repository for tests and single-process use.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;
use filedeck_entity::file::{CreateFile, File, FilePatch};
use filedeck_entity::folder::{CreateFolder, Folder, FolderPatch, TreeArena, check_reparent};

use crate::store::{FileFilter, FolderFilter, ParentScope, TreeRepository};

/// Tree repository backed by a [`TreeArena`] behind a Tokio mutex.
///
/// Every operation holds the mutex for its whole check-then-write
/// sequence, so writes are fully serialized.
#[derive(Debug, Clone, Default)]
pub struct MemoryTreeRepository {
    state: Arc<Mutex<TreeArena>>,
}

impl MemoryTreeRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository over existing records.
    pub fn with_arena(arena: TreeArena) -> Self {
        Self {
            state: Arc::new(Mutex::new(arena)),
        }
    }
}

/// Resolve a folder that new children of `owner_id` may be placed in.
fn require_owned_folder(arena: &TreeArena, owner_id: Uuid, folder_id: Uuid) -> AppResult<()> {
    match arena.folder(folder_id) {
        Some(folder) if folder.owner_id == owner_id => Ok(()),
        _ => Err(AppError::not_found(format!("Folder {folder_id} not found"))),
    }
}

fn sibling_conflict(name: &str) -> AppError {
    AppError::conflict(format!(
        "A folder named '{name}' already exists in this location"
    ))
}

fn parent_matches(scope: ParentScope, parent_id: Option<Uuid>) -> bool {
    match scope {
        ParentScope::Any => true,
        ParentScope::Root => parent_id.is_none(),
        ParentScope::In(id) => parent_id == Some(id),
    }
}

#[async_trait]
impl TreeRepository for MemoryTreeRepository {
    async fn find_folder(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.state.lock().await.folder(id).cloned())
    }

    async fn find_file(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.state.lock().await.file(id).cloned())
    }

    async fn find_folders(&self, filter: &FolderFilter) -> AppResult<Vec<Folder>> {
        let arena = self.state.lock().await;
        let mut folders: Vec<Folder> = arena
            .folders()
            .filter(|f| filter.owner_id.is_none_or(|o| f.owner_id == o))
            .filter(|f| parent_matches(filter.parent, f.parent_id))
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(folders)
    }

    async fn find_files(&self, filter: &FileFilter) -> AppResult<Vec<File>> {
        let arena = self.state.lock().await;
        let mut files: Vec<File> = arena
            .files()
            .filter(|f| filter.owner_id.is_none_or(|o| f.owner_id == o))
            .filter(|f| parent_matches(filter.parent, f.folder_id))
            .cloned()
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(files)
    }

    async fn child_counts(&self, folder_id: Uuid) -> AppResult<(u64, u64)> {
        Ok(self.state.lock().await.direct_counts(folder_id))
    }

    async fn insert_folder(&self, data: CreateFolder) -> AppResult<Folder> {
        let mut arena = self.state.lock().await;

        if let Some(parent_id) = data.parent_id {
            require_owned_folder(&arena, data.owner_id, parent_id)?;
        }
        if arena.sibling_name_taken(data.owner_id, data.parent_id, &data.name, None) {
            return Err(sibling_conflict(&data.name));
        }

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: data.name,
            parent_id: data.parent_id,
            owner_id: data.owner_id,
            is_public: data.is_public,
            created_at: now,
            updated_at: now,
        };
        arena.insert_folder(folder.clone());
        debug!(folder_id = %folder.id, "Inserted folder");
        Ok(folder)
    }

    async fn update_folder(&self, id: Uuid, patch: FolderPatch) -> AppResult<Folder> {
        let mut arena = self.state.lock().await;

        let mut folder = arena
            .folder(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        if let Some(Some(target_id)) = patch.parent_id {
            require_owned_folder(&arena, folder.owner_id, target_id)?;
            check_reparent(id, &arena.ancestors(target_id)?)?;
        }

        patch.apply(&mut folder);

        if patch.touches_placement()
            && arena.sibling_name_taken(folder.owner_id, folder.parent_id, &folder.name, Some(id))
        {
            return Err(sibling_conflict(&folder.name));
        }

        arena.insert_folder(folder.clone());
        Ok(folder)
    }

    async fn delete_folder(&self, id: Uuid) -> AppResult<bool> {
        let mut arena = self.state.lock().await;
        let (subfolders, files) = arena.direct_counts(id);
        if subfolders > 0 || files > 0 {
            return Err(AppError::not_empty(subfolders, files));
        }
        Ok(arena.remove_folder(id).is_some())
    }

    async fn insert_file(&self, data: CreateFile) -> AppResult<File> {
        let mut arena = self.state.lock().await;

        if let Some(folder_id) = data.folder_id {
            require_owned_folder(&arena, data.owner_id, folder_id)?;
        }
        if arena.files().any(|f| f.storage_path == data.storage_path) {
            return Err(AppError::conflict(format!(
                "Storage path '{}' is already in use",
                data.storage_path
            )));
        }

        let file = data.into_file();
        arena.insert_file(file.clone());
        debug!(file_id = %file.id, "Inserted file");
        Ok(file)
    }

    async fn update_file(&self, id: Uuid, patch: FilePatch) -> AppResult<File> {
        let mut arena = self.state.lock().await;

        let mut file = arena
            .file(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        if let Some(Some(folder_id)) = patch.folder_id {
            require_owned_folder(&arena, file.owner_id, folder_id)?;
        }

        patch.apply(&mut file);
        arena.insert_file(file.clone());
        Ok(file)
    }

    async fn delete_file(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.lock().await.remove_file(id).is_some())
    }

    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Folder>> {
        let arena = self.state.lock().await;
        if arena.folder(id).is_none() {
            return Ok(Vec::new());
        }
        Ok(arena
            .ancestors(id)?
            .into_iter()
            .filter_map(|folder_id| arena.folder(folder_id).cloned())
            .collect())
    }

    async fn load_subtree(&self, id: Uuid) -> AppResult<TreeArena> {
        let arena = self.state.lock().await;
        let Some(root) = arena.folder(id).cloned() else {
            return Ok(TreeArena::new());
        };

        let subtree = arena.subtree(id);
        let folders = std::iter::once(root).chain(
            subtree
                .folders
                .iter()
                .filter_map(|folder_id| arena.folder(*folder_id).cloned()),
        );
        let files = subtree
            .files
            .iter()
            .filter_map(|file_id| arena.file(*file_id).cloned());

        Ok(TreeArena::from_records(folders.collect::<Vec<_>>(), files.collect::<Vec<_>>()))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
