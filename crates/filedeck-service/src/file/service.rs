//! File metadata operations: get, rename, move, patch, delete.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;
use filedeck_core::traits::StorageProvider;
use filedeck_database::TreeRepository;
use filedeck_entity::file::{File, FilePatch};

use crate::context::RequestContext;
use crate::outcome::{DeleteOutcome, purge_file};
use crate::validation::normalize_name;

/// Data for updating a file's metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFileRequest {
    /// New display name.
    pub name: Option<String>,
    /// New visibility.
    pub is_public: Option<bool>,
}

/// Handles file metadata operations.
#[derive(Debug, Clone)]
pub struct FileService {
    /// Tree persistence.
    repo: Arc<dyn TreeRepository>,
    /// Content storage.
    storage: Arc<dyn StorageProvider>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(repo: Arc<dyn TreeRepository>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { repo, storage }
    }

    /// Gets a file the acting owner may read.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<File> {
        self.repo
            .find_file(file_id)
            .await?
            .filter(|f| f.is_readable_by(ctx.owner_id))
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    async fn owned_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<File> {
        self.repo
            .find_file(file_id)
            .await?
            .filter(|f| ctx.owns(f.owner_id))
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Renames a file. File names need not be unique among siblings.
    pub async fn rename_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        new_name: &str,
    ) -> AppResult<File> {
        self.update_file(
            ctx,
            file_id,
            UpdateFileRequest {
                name: Some(new_name.to_string()),
                is_public: None,
            },
        )
        .await
    }

    /// Updates display name and/or visibility.
    pub async fn update_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        req: UpdateFileRequest,
    ) -> AppResult<File> {
        let name = req
            .name
            .as_deref()
            .map(|n| normalize_name("File", n))
            .transpose()?;
        let file = self.owned_file(ctx, file_id).await?;

        let patch = FilePatch {
            name,
            folder_id: None,
            is_public: req.is_public,
        };
        if patch.is_empty() {
            return Ok(file);
        }

        let updated = self.repo.update_file(file_id, patch).await?;
        info!(
            owner_id = %ctx.owner_id,
            file_id = %file_id,
            name = %updated.name,
            is_public = updated.is_public,
            "File updated"
        );
        Ok(updated)
    }

    /// Moves a file into a folder, or to root level with `None`.
    pub async fn move_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        target_folder_id: Option<Uuid>,
    ) -> AppResult<File> {
        self.owned_file(ctx, file_id).await?;

        let moved = self
            .repo
            .update_file(
                file_id,
                FilePatch {
                    folder_id: Some(target_folder_id),
                    ..FilePatch::default()
                },
            )
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file_id,
            target_folder_id = ?target_folder_id,
            "File moved"
        );
        Ok(moved)
    }

    /// Deletes a file. The stored object is removed best-effort; the record
    /// is always removed.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<DeleteOutcome> {
        let file = self.owned_file(ctx, file_id).await?;

        let mut outcome = DeleteOutcome::default();
        purge_file(self.repo.as_ref(), self.storage.as_ref(), &file, &mut outcome).await?;

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file_id,
            name = %file.name,
            storage_failures = outcome.storage_failures.len(),
            "File deleted"
        );
        Ok(outcome)
    }
}
