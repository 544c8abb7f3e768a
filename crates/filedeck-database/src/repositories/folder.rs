//! Folder queries.
//!
//! Every function is generic over the executor so the same statements run
//! against the pool for reads and inside a transaction for guarded writes.

use sqlx::PgExecutor;
use uuid::Uuid;

use filedeck_core::error::{AppError, ErrorKind};
use filedeck_core::result::AppResult;
use filedeck_entity::folder::Folder;

use super::{is_foreign_key_violation, is_unique_violation};
use crate::store::{FolderFilter, ParentScope};

/// Name of the unique index enforcing sibling-name uniqueness.
pub const SIBLING_NAME_INDEX: &str = "folders_sibling_name_key";

/// Find a folder by ID.
pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> AppResult<Option<Folder>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
}

/// List folders matching a filter, sorted by name.
pub async fn find_many<'e, E>(executor: E, filter: &FolderFilter) -> AppResult<Vec<Folder>>
where
    E: PgExecutor<'e>,
{
    let (any_parent, parent_id) = match filter.parent {
        ParentScope::Any => (true, None),
        ParentScope::Root => (false, None),
        ParentScope::In(id) => (false, Some(id)),
    };

    sqlx::query_as::<_, Folder>(
        "SELECT * FROM folders \
         WHERE ($1::uuid IS NULL OR owner_id = $1) \
           AND ($2 OR parent_id IS NOT DISTINCT FROM $3) \
         ORDER BY name ASC, id ASC",
    )
    .bind(filter.owner_id)
    .bind(any_parent)
    .bind(parent_id)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
}

/// Count the folders of an owner.
pub async fn count_for_owner<'e, E>(executor: E, owner_id: Uuid) -> AppResult<i64>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count folders", e))
}

/// Count the direct child folders of a folder.
pub async fn count_children<'e, E>(executor: E, folder_id: Uuid) -> AppResult<i64>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = $1")
        .bind(folder_id)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count children", e))
}

/// Whether another folder of the owner already uses `name` under `parent_id`.
pub async fn sibling_name_exists<'e, E>(
    executor: E,
    owner_id: Uuid,
    parent_id: Option<Uuid>,
    name: &str,
    exclude: Option<Uuid>,
) -> AppResult<bool>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT EXISTS( \
            SELECT 1 FROM folders \
            WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND name = $3 \
              AND ($4::uuid IS NULL OR id <> $4))",
    )
    .bind(owner_id)
    .bind(parent_id)
    .bind(name)
    .bind(exclude)
    .fetch_one(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check folder name", e))
}

/// `(id, parent_id)` pairs walking upward from a folder, at most `max_rows`
/// steps. The caller validates the chain.
pub async fn parent_links<'e, E>(
    executor: E,
    folder_id: Uuid,
    max_rows: i64,
) -> AppResult<Vec<(Uuid, Option<Uuid>)>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, (Uuid, Option<Uuid>)>(
        "WITH RECURSIVE chain(id, parent_id, step) AS ( \
            SELECT id, parent_id, 0 FROM folders WHERE id = $1 \
            UNION ALL \
            SELECT f.id, f.parent_id, c.step + 1 FROM folders f \
            INNER JOIN chain c ON f.id = c.parent_id \
            WHERE c.step < $2 \
         ) SELECT id, parent_id FROM chain ORDER BY step ASC",
    )
    .bind(folder_id)
    .bind(max_rows)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to walk ancestors", e))
}

/// A folder and every descendant folder, bounded by `max_depth`.
pub async fn find_subtree<'e, E>(executor: E, folder_id: Uuid, max_depth: i64) -> AppResult<Vec<Folder>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Folder>(
        "WITH RECURSIVE tree AS ( \
            SELECT folders.*, 0 AS depth FROM folders WHERE id = $1 \
            UNION ALL \
            SELECT f.*, t.depth + 1 FROM folders f \
            INNER JOIN tree t ON f.parent_id = t.id \
            WHERE t.depth < $2 \
         ) SELECT DISTINCT ON (id) id, name, parent_id, owner_id, is_public, created_at, updated_at \
           FROM tree ORDER BY id, depth",
    )
    .bind(folder_id)
    .bind(max_depth)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load subtree", e))
}

/// Insert a folder row.
pub async fn insert<'e, E>(executor: E, folder: &Folder) -> AppResult<Folder>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Folder>(
        "INSERT INTO folders (id, name, parent_id, owner_id, is_public, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(folder.id)
    .bind(&folder.name)
    .bind(folder.parent_id)
    .bind(folder.owner_id)
    .bind(folder.is_public)
    .bind(folder.created_at)
    .bind(folder.updated_at)
    .fetch_one(executor)
    .await
    .map_err(|e| write_error(e, &folder.name, "Failed to create folder"))
}

/// Write name, parent, and visibility of an existing folder.
pub async fn update<'e, E>(executor: E, folder: &Folder) -> AppResult<Folder>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Folder>(
        "UPDATE folders SET name = $2, parent_id = $3, is_public = $4, updated_at = $5 \
         WHERE id = $1 RETURNING *",
    )
    .bind(folder.id)
    .bind(&folder.name)
    .bind(folder.parent_id)
    .bind(folder.is_public)
    .bind(folder.updated_at)
    .fetch_optional(executor)
    .await
    .map_err(|e| write_error(e, &folder.name, "Failed to update folder"))?
    .ok_or_else(|| AppError::not_found(format!("Folder {} not found", folder.id)))
}

/// Delete a folder row.
pub async fn delete<'e, E>(executor: E, id: Uuid) -> AppResult<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM folders WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::new(ErrorKind::NotEmpty, "Folder still has contents")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to delete folder", e)
            }
        })?;
    Ok(result.rows_affected() > 0)
}

fn write_error(e: sqlx::Error, name: &str, context: &str) -> AppError {
    if is_unique_violation(&e, SIBLING_NAME_INDEX) {
        AppError::conflict(format!(
            "A folder named '{name}' already exists in this location"
        ))
    } else if is_foreign_key_violation(&e) {
        AppError::not_found("Parent folder not found")
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), e)
    }
}
