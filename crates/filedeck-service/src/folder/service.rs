//! Folder operations: listing, create, rename, move, visibility, delete.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;
use filedeck_core::traits::StorageProvider;
use filedeck_database::{FileFilter, FolderFilter, TreeRepository};
use filedeck_entity::file::File;
use filedeck_entity::folder::{CreateFolder, Folder, FolderPatch};

use crate::context::RequestContext;
use crate::outcome::{DeleteOutcome, purge_file};
use crate::validation::normalize_name;

/// Root-level contents of an owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootListing {
    /// Root folders, sorted by name.
    pub folders: Vec<Folder>,
    /// Root files, newest first.
    pub files: Vec<File>,
}

/// A folder with its direct children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderListing {
    /// The folder itself.
    pub folder: Folder,
    /// Direct subfolders, sorted by name.
    pub subfolders: Vec<Folder>,
    /// Direct files, newest first.
    pub files: Vec<File>,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder (None for root level).
    pub parent_id: Option<Uuid>,
    /// Visibility flag.
    pub is_public: bool,
}

/// Manages folder operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Tree persistence.
    repo: Arc<dyn TreeRepository>,
    /// Content storage, for purging files on delete.
    storage: Arc<dyn StorageProvider>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(repo: Arc<dyn TreeRepository>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { repo, storage }
    }

    /// Lists the root-level folders and files of the acting owner.
    pub async fn list_root(&self, ctx: &RequestContext) -> AppResult<RootListing> {
        let folders = self
            .repo
            .find_folders(&FolderFilter::root_of(ctx.owner_id))
            .await?;
        let files = self
            .repo
            .find_files(&FileFilter::root_of(ctx.owner_id))
            .await?;
        Ok(RootListing { folders, files })
    }

    /// Gets a folder the acting owner may read.
    pub async fn get_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Folder> {
        self.repo
            .find_folder(folder_id)
            .await?
            .filter(|f| f.is_readable_by(ctx.owner_id))
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    /// Gets a folder owned by the acting owner.
    async fn owned_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Folder> {
        self.repo
            .find_folder(folder_id)
            .await?
            .filter(|f| ctx.owns(f.owner_id))
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    /// Lists a folder with its direct subfolders and files.
    ///
    /// Children the acting owner may not read are left out.
    pub async fn list_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<FolderListing> {
        let folder = self.get_folder(ctx, folder_id).await?;

        let subfolders = self
            .repo
            .find_folders(&FolderFilter::children_of(folder_id))
            .await?
            .into_iter()
            .filter(|f| f.is_readable_by(ctx.owner_id))
            .collect();
        let files = self
            .repo
            .find_files(&FileFilter::in_folder(folder_id))
            .await?
            .into_iter()
            .filter(|f| f.is_readable_by(ctx.owner_id))
            .collect();

        Ok(FolderListing {
            folder,
            subfolders,
            files,
        })
    }

    /// Creates a new folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        let name = normalize_name("Folder", &req.name)?;

        let folder = self
            .repo
            .insert_folder(CreateFolder {
                name,
                parent_id: req.parent_id,
                owner_id: ctx.owner_id,
                is_public: req.is_public,
            })
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            name = %folder.name,
            "Folder created"
        );

        Ok(folder)
    }

    /// Renames a folder. Renaming to the current name changes nothing.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_name: &str,
    ) -> AppResult<Folder> {
        let name = normalize_name("Folder", new_name)?;
        let folder = self.owned_folder(ctx, folder_id).await?;
        if folder.name == name {
            return Ok(folder);
        }

        let updated = self
            .repo
            .update_folder(folder_id, FolderPatch::rename(name))
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            old_name = %folder.name,
            new_name = %updated.name,
            "Folder renamed"
        );

        Ok(updated)
    }

    /// Moves a folder under a new parent, or to root level with `None`.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        target_parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        self.owned_folder(ctx, folder_id).await?;
        if target_parent_id == Some(folder_id) {
            return Err(AppError::invalid_operation("Cannot move a folder into itself"));
        }

        let moved = self
            .repo
            .update_folder(folder_id, FolderPatch::reparent(target_parent_id))
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            target_parent_id = ?target_parent_id,
            "Folder moved"
        );

        Ok(moved)
    }

    /// Sets the visibility of a folder.
    pub async fn set_visibility(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        is_public: bool,
    ) -> AppResult<Folder> {
        self.owned_folder(ctx, folder_id).await?;
        self.repo
            .update_folder(
                folder_id,
                FolderPatch {
                    is_public: Some(is_public),
                    ..FolderPatch::default()
                },
            )
            .await
    }

    /// Deletes a folder.
    ///
    /// Without `recursive`, a folder that still has children fails with
    /// `NotEmpty` and its direct child counts. With `recursive`, every
    /// descendant file is purged first, then descendant folders deepest
    /// first, then the folder itself. The walk is not atomic: an
    /// interruption leaves the records not yet reached in place.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        recursive: bool,
    ) -> AppResult<DeleteOutcome> {
        let folder = self.owned_folder(ctx, folder_id).await?;

        let (subfolder_count, file_count) = self.repo.child_counts(folder_id).await?;
        if !recursive && (subfolder_count > 0 || file_count > 0) {
            return Err(AppError::not_empty(subfolder_count, file_count));
        }

        let arena = self.repo.load_subtree(folder_id).await?;
        let subtree = arena.subtree(folder_id);
        let mut outcome = DeleteOutcome::default();

        for file_id in &subtree.files {
            if let Some(file) = arena.file(*file_id) {
                purge_file(self.repo.as_ref(), self.storage.as_ref(), file, &mut outcome).await?;
            }
        }
        for descendant_id in subtree.folders_deepest_first() {
            if self.repo.delete_folder(*descendant_id).await? {
                outcome.folders_deleted += 1;
            }
        }
        if self.repo.delete_folder(folder_id).await? {
            outcome.folders_deleted += 1;
        }

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            name = %folder.name,
            recursive,
            folders_deleted = outcome.folders_deleted,
            files_deleted = outcome.files_deleted,
            storage_failures = outcome.storage_failures.len(),
            "Folder deleted"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedeck_core::error::ErrorKind;

    use crate::test_support::Harness;

    fn named(name: &str, parent_id: Option<Uuid>) -> CreateFolderRequest {
        CreateFolderRequest {
            name: name.to_string(),
            parent_id,
            is_public: false,
        }
    }

    #[tokio::test]
    async fn test_create_conflict_scoped_to_parent_and_owner() {
        let h = Harness::new().await;
        let docs = h.folders.create_folder(&h.ctx, named("Docs", None)).await.unwrap();

        let err = h
            .folders
            .create_folder(&h.ctx, named(" Docs ", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        h.folders
            .create_folder(&h.ctx, named("Docs", Some(docs.id)))
            .await
            .unwrap();
        h.folders
            .create_folder(&h.other, named("Docs", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_under_missing_parent() {
        let h = Harness::new().await;
        let err = h
            .folders
            .create_folder(&h.ctx, named("Orphan", Some(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_name_before_persistence() {
        let h = Harness::new().await;
        let err = h
            .folders
            .create_folder(&h.ctx, named("a/b", Some(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_rename_round_trip() {
        let h = Harness::new().await;
        let docs = h.folders.create_folder(&h.ctx, named("Docs", None)).await.unwrap();
        let work = h
            .folders
            .create_folder(&h.ctx, named("Work", Some(docs.id)))
            .await
            .unwrap();
        h.folders
            .create_folder(&h.ctx, named("Play", Some(docs.id)))
            .await
            .unwrap();

        let renamed = h.folders.rename_folder(&h.ctx, work.id, "Office").await.unwrap();
        assert!(renamed.updated_at >= work.updated_at);

        let listing = h.folders.list_folder(&h.ctx, docs.id).await.unwrap();
        let names: Vec<&str> = listing.subfolders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Office", "Play"]);

        let err = h
            .folders
            .rename_folder(&h.ctx, work.id, "Play")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let same = h.folders.rename_folder(&h.ctx, work.id, "Office").await.unwrap();
        assert_eq!(same.updated_at, renamed.updated_at);
    }

    #[tokio::test]
    async fn test_docs_work_scenario() {
        let h = Harness::new().await;
        let docs = h.folders.create_folder(&h.ctx, named("Docs", None)).await.unwrap();
        let work = h
            .folders
            .create_folder(&h.ctx, named("Work", Some(docs.id)))
            .await
            .unwrap();

        let err = h
            .folders
            .move_folder(&h.ctx, docs.id, Some(work.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperation);

        let err = h
            .folders
            .move_folder(&h.ctx, docs.id, Some(docs.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperation);

        let err = h
            .folders
            .delete_folder(&h.ctx, docs.id, false)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotEmpty);
        assert_eq!(err.detail_u64("subfolder_count"), Some(1));
        assert_eq!(err.detail_u64("file_count"), Some(0));

        let outcome = h.folders.delete_folder(&h.ctx, docs.id, true).await.unwrap();
        assert_eq!(outcome.folders_deleted, 2);
        assert!(h.folders.list_root(&h.ctx).await.unwrap().folders.is_empty());
        let err = h.folders.get_folder(&h.ctx, work.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_move_to_root_and_sibling_conflict() {
        let h = Harness::new().await;
        let a = h.folders.create_folder(&h.ctx, named("A", None)).await.unwrap();
        let inner = h
            .folders
            .create_folder(&h.ctx, named("A", Some(a.id)))
            .await
            .unwrap();

        let err = h
            .folders
            .move_folder(&h.ctx, inner.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        h.folders.rename_folder(&h.ctx, inner.id, "B").await.unwrap();
        let moved = h.folders.move_folder(&h.ctx, inner.id, None).await.unwrap();
        assert!(moved.is_root());

        let err = h
            .folders
            .move_folder(&h.ctx, a.id, Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_recursive_delete_purges_storage() {
        let h = Harness::new().await;
        let docs = h.folders.create_folder(&h.ctx, named("Docs", None)).await.unwrap();
        let deep = h
            .folders
            .create_folder(&h.ctx, named("Deep", Some(docs.id)))
            .await
            .unwrap();
        let top = h.upload(Some(docs.id), "top.txt", "top").await;
        let low = h.upload(Some(deep.id), "low.txt", "low").await;

        let err = h
            .folders
            .delete_folder(&h.ctx, docs.id, false)
            .await
            .unwrap_err();
        assert_eq!(err.detail_u64("subfolder_count"), Some(1));
        assert_eq!(err.detail_u64("file_count"), Some(1));

        let outcome = h.folders.delete_folder(&h.ctx, docs.id, true).await.unwrap();
        assert_eq!(outcome.folders_deleted, 2);
        assert_eq!(outcome.files_deleted, 2);
        assert!(outcome.is_complete());

        assert!(!h.storage.exists(&top.storage_path).await.unwrap());
        assert!(!h.storage.exists(&low.storage_path).await.unwrap());
        assert!(h.repo.find_file(low.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_owner_sees_only_public() {
        let h = Harness::new().await;
        let private = h.folders.create_folder(&h.ctx, named("Private", None)).await.unwrap();
        let shared = h
            .folders
            .create_folder(
                &h.ctx,
                CreateFolderRequest {
                    name: "Shared".into(),
                    parent_id: None,
                    is_public: true,
                },
            )
            .await
            .unwrap();

        let err = h.folders.get_folder(&h.other, private.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(h.folders.list_folder(&h.other, shared.id).await.is_ok());

        // Public is read-only for other owners.
        let err = h
            .folders
            .rename_folder(&h.other, shared.id, "Mine")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = h
            .folders
            .delete_folder(&h.other, shared.id, true)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
