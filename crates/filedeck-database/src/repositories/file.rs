//! File queries.

use sqlx::PgExecutor;
use uuid::Uuid;

use filedeck_core::error::{AppError, ErrorKind};
use filedeck_core::result::AppResult;
use filedeck_entity::file::File;

use super::{is_foreign_key_violation, is_unique_violation};
use crate::store::{FileFilter, ParentScope};

/// Name of the unique constraint on storage paths.
pub const STORAGE_PATH_KEY: &str = "files_storage_path_key";

/// Find a file by ID.
pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> AppResult<Option<File>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
}

/// List files matching a filter, newest first.
pub async fn find_many<'e, E>(executor: E, filter: &FileFilter) -> AppResult<Vec<File>>
where
    E: PgExecutor<'e>,
{
    let (any_parent, folder_id) = match filter.parent {
        ParentScope::Any => (true, None),
        ParentScope::Root => (false, None),
        ParentScope::In(id) => (false, Some(id)),
    };

    sqlx::query_as::<_, File>(
        "SELECT * FROM files \
         WHERE ($1::uuid IS NULL OR owner_id = $1) \
           AND ($2 OR folder_id IS NOT DISTINCT FROM $3) \
         ORDER BY created_at DESC, id ASC",
    )
    .bind(filter.owner_id)
    .bind(any_parent)
    .bind(folder_id)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
}

/// Files whose folder is one of `folder_ids`.
pub async fn find_in_folders<'e, E>(executor: E, folder_ids: &[Uuid]) -> AppResult<Vec<File>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, File>("SELECT * FROM files WHERE folder_id = ANY($1)")
        .bind(folder_ids)
        .fetch_all(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list subtree files", e))
}

/// Count the files directly in a folder.
pub async fn count_in_folder<'e, E>(executor: E, folder_id: Uuid) -> AppResult<i64>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE folder_id = $1")
        .bind(folder_id)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))
}

/// Insert a file row.
pub async fn insert<'e, E>(executor: E, file: &File) -> AppResult<File>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, File>(
        "INSERT INTO files (id, name, original_name, kind, mime_type, size_bytes, storage_path, \
         folder_id, owner_id, is_public, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
    )
    .bind(file.id)
    .bind(&file.name)
    .bind(&file.original_name)
    .bind(file.kind)
    .bind(&file.mime_type)
    .bind(file.size_bytes)
    .bind(&file.storage_path)
    .bind(file.folder_id)
    .bind(file.owner_id)
    .bind(file.is_public)
    .bind(file.created_at)
    .bind(file.updated_at)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, STORAGE_PATH_KEY) {
            AppError::conflict(format!(
                "Storage path '{}' is already in use",
                file.storage_path
            ))
        } else if is_foreign_key_violation(&e) {
            AppError::not_found("Folder not found")
        } else {
            AppError::with_source(ErrorKind::Database, "Failed to create file", e)
        }
    })
}

/// Write name, folder, and visibility of an existing file.
pub async fn update<'e, E>(executor: E, file: &File) -> AppResult<File>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, File>(
        "UPDATE files SET name = $2, folder_id = $3, is_public = $4, updated_at = $5 \
         WHERE id = $1 RETURNING *",
    )
    .bind(file.id)
    .bind(&file.name)
    .bind(file.folder_id)
    .bind(file.is_public)
    .bind(file.updated_at)
    .fetch_optional(executor)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::not_found("Folder not found")
        } else {
            AppError::with_source(ErrorKind::Database, "Failed to update file", e)
        }
    })?
    .ok_or_else(|| AppError::not_found(format!("File {} not found", file.id)))
}

/// Delete a file row.
pub async fn delete<'e, E>(executor: E, id: Uuid) -> AppResult<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM files WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
    Ok(result.rows_affected() > 0)
}
