//! PostgreSQL tree repository.
//!
//! Structural folder writes run inside one transaction that first takes a
//! transaction-scoped advisory lock keyed by the owner. Checks and the
//! write therefore observe a stable view of that owner's tree. The unique
//! index on sibling names backs the check up and surfaces as `Conflict`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPool;
use sqlx::{PgConnection, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use filedeck_core::error::{AppError, ErrorKind};
use filedeck_core::result::AppResult;
use filedeck_entity::file::{CreateFile, File, FilePatch};
use filedeck_entity::folder::{
    CreateFolder, Folder, FolderPatch, TreeArena, ancestor_chain, check_reparent,
};

use crate::repositories::{file, folder};
use crate::store::{FileFilter, FolderFilter, TreeRepository};

/// Tree repository backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgTreeRepository {
    pool: PgPool,
}

impl PgTreeRepository {
    /// Create a new repository over a pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }
}

async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
}

/// Serialize structural writes of one owner until the transaction ends.
async fn lock_owner(conn: &mut PgConnection, owner_id: Uuid) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended(($1::uuid)::text, 0))")
        .bind(owner_id)
        .execute(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock owner tree", e))?;
    Ok(())
}

/// Resolve a folder that children of `owner_id` may be placed in.
async fn require_owned_folder(
    conn: &mut PgConnection,
    owner_id: Uuid,
    folder_id: Uuid,
) -> AppResult<Folder> {
    match folder::find_by_id(conn, folder_id).await? {
        Some(found) if found.owner_id == owner_id => Ok(found),
        _ => Err(AppError::not_found(format!("Folder {folder_id} not found"))),
    }
}

/// Ancestor ids of `folder_id`, nearest first, validated to terminate.
async fn ancestor_ids(
    conn: &mut PgConnection,
    owner_id: Uuid,
    folder_id: Uuid,
) -> AppResult<Vec<Uuid>> {
    let folder_count = folder::count_for_owner(&mut *conn, owner_id).await?;
    let links = folder::parent_links(&mut *conn, folder_id, folder_count + 1).await?;
    let parents: HashMap<Uuid, Option<Uuid>> = links.into_iter().collect();

    ancestor_chain(folder_id, folder_count as usize + 1, |id| {
        parents.get(&id).copied()
    })
}

/// `NotEmpty` with the child counts unless both are zero.
fn ensure_empty(subfolders: i64, files: i64) -> AppResult<()> {
    if subfolders > 0 || files > 0 {
        return Err(AppError::not_empty(subfolders as u64, files as u64));
    }
    Ok(())
}

fn sibling_conflict(name: &str) -> AppError {
    AppError::conflict(format!(
        "A folder named '{name}' already exists in this location"
    ))
}

#[async_trait]
impl TreeRepository for PgTreeRepository {
    async fn find_folder(&self, id: Uuid) -> AppResult<Option<Folder>> {
        folder::find_by_id(&self.pool, id).await
    }

    async fn find_file(&self, id: Uuid) -> AppResult<Option<File>> {
        file::find_by_id(&self.pool, id).await
    }

    async fn find_folders(&self, filter: &FolderFilter) -> AppResult<Vec<Folder>> {
        folder::find_many(&self.pool, filter).await
    }

    async fn find_files(&self, filter: &FileFilter) -> AppResult<Vec<File>> {
        file::find_many(&self.pool, filter).await
    }

    async fn child_counts(&self, folder_id: Uuid) -> AppResult<(u64, u64)> {
        let folders = folder::count_children(&self.pool, folder_id).await?;
        let files = file::count_in_folder(&self.pool, folder_id).await?;
        Ok((folders as u64, files as u64))
    }

    async fn insert_folder(&self, data: CreateFolder) -> AppResult<Folder> {
        let mut tx = self.begin().await?;
        lock_owner(&mut tx, data.owner_id).await?;

        if let Some(parent_id) = data.parent_id {
            require_owned_folder(&mut tx, data.owner_id, parent_id).await?;
        }
        if folder::sibling_name_exists(&mut *tx, data.owner_id, data.parent_id, &data.name, None)
            .await?
        {
            return Err(sibling_conflict(&data.name));
        }

        let now = Utc::now();
        let record = Folder {
            id: Uuid::new_v4(),
            name: data.name,
            parent_id: data.parent_id,
            owner_id: data.owner_id,
            is_public: data.is_public,
            created_at: now,
            updated_at: now,
        };
        let created = folder::insert(&mut *tx, &record).await?;
        commit(tx).await?;

        debug!(folder_id = %created.id, "Inserted folder");
        Ok(created)
    }

    async fn update_folder(&self, id: Uuid, patch: FolderPatch) -> AppResult<Folder> {
        let owner_id = folder::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?
            .owner_id;

        let mut tx = self.begin().await?;
        lock_owner(&mut tx, owner_id).await?;

        // Re-read under the lock.
        let mut current = folder::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        if let Some(Some(target_id)) = patch.parent_id {
            require_owned_folder(&mut tx, owner_id, target_id).await?;
            let chain = ancestor_ids(&mut tx, owner_id, target_id).await?;
            check_reparent(id, &chain)?;
        }

        patch.apply(&mut current);

        if patch.touches_placement()
            && folder::sibling_name_exists(
                &mut *tx,
                owner_id,
                current.parent_id,
                &current.name,
                Some(id),
            )
            .await?
        {
            return Err(sibling_conflict(&current.name));
        }

        let updated = folder::update(&mut *tx, &current).await?;
        commit(tx).await?;
        Ok(updated)
    }

    async fn delete_folder(&self, id: Uuid) -> AppResult<bool> {
        let Some(owner_id) = folder::find_by_id(&self.pool, id).await?.map(|f| f.owner_id) else {
            return Ok(false);
        };

        let mut tx = self.begin().await?;
        lock_owner(&mut tx, owner_id).await?;

        let subfolders = folder::count_children(&mut *tx, id).await?;
        let files = file::count_in_folder(&mut *tx, id).await?;
        ensure_empty(subfolders, files)?;

        match folder::delete(&mut *tx, id).await {
            Ok(deleted) => {
                commit(tx).await?;
                Ok(deleted)
            }
            // File writes do not take the owner lock, so one can land after the count.
            Err(e) if e.kind == ErrorKind::NotEmpty => {
                drop(tx);
                let (subfolders, files) = self.child_counts(id).await?;
                Err(AppError::not_empty(subfolders, files))
            }
            Err(e) => Err(e),
        }
    }

    async fn insert_file(&self, data: CreateFile) -> AppResult<File> {
        if let Some(folder_id) = data.folder_id {
            let mut conn = self.pool.acquire().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
            })?;
            require_owned_folder(&mut conn, data.owner_id, folder_id).await?;
        }

        let created = file::insert(&self.pool, &data.into_file()).await?;
        debug!(file_id = %created.id, "Inserted file");
        Ok(created)
    }

    async fn update_file(&self, id: Uuid, patch: FilePatch) -> AppResult<File> {
        let mut current = file::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        if let Some(Some(folder_id)) = patch.folder_id {
            let mut conn = self.pool.acquire().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
            })?;
            require_owned_folder(&mut conn, current.owner_id, folder_id).await?;
        }

        patch.apply(&mut current);
        file::update(&self.pool, &current).await
    }

    async fn delete_file(&self, id: Uuid) -> AppResult<bool> {
        file::delete(&self.pool, id).await
    }

    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Folder>> {
        let Some(start) = folder::find_by_id(&self.pool, id).await? else {
            return Ok(Vec::new());
        };

        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        let chain = ancestor_ids(&mut conn, start.owner_id, id).await?;

        let mut folders = Vec::with_capacity(chain.len());
        for folder_id in chain {
            if let Some(found) = folder::find_by_id(&mut *conn, folder_id).await? {
                folders.push(found);
            }
        }
        Ok(folders)
    }

    async fn load_subtree(&self, id: Uuid) -> AppResult<TreeArena> {
        let Some(root) = folder::find_by_id(&self.pool, id).await? else {
            return Ok(TreeArena::new());
        };

        let max_depth = folder::count_for_owner(&self.pool, root.owner_id).await?;
        let folders = folder::find_subtree(&self.pool, id, max_depth).await?;
        let folder_ids: Vec<Uuid> = folders.iter().map(|f| f.id).collect();
        let files = file::find_in_folders(&self.pool, &folder_ids).await?;

        Ok(TreeArena::from_records(folders, files))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
