//! Delete outcomes and the shared file purge step.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use filedeck_core::error::ErrorKind;
use filedeck_core::result::AppResult;
use filedeck_core::traits::StorageProvider;
use filedeck_database::TreeRepository;
use filedeck_entity::file::File;

/// A stored object that could not be removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageFailure {
    /// The file whose content was left behind.
    pub file_id: Uuid,
    /// Its storage path.
    pub storage_path: String,
    /// The storage error message.
    pub message: String,
}

/// What a delete actually removed.
///
/// A non-empty `storage_failures` marks a partial effect: metadata is gone
/// but content was left in storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// Folder records removed.
    pub folders_deleted: u64,
    /// File records removed.
    pub files_deleted: u64,
    /// Stored objects left behind.
    pub storage_failures: Vec<StorageFailure>,
}

impl DeleteOutcome {
    /// Whether every stored object was removed.
    pub fn is_complete(&self) -> bool {
        self.storage_failures.is_empty()
    }
}

/// Remove a file's stored object (best-effort) and then its record.
///
/// An object that is already missing is not a failure.
pub(crate) async fn purge_file(
    repo: &dyn TreeRepository,
    storage: &dyn StorageProvider,
    file: &File,
    outcome: &mut DeleteOutcome,
) -> AppResult<()> {
    match storage.delete(&file.storage_path).await {
        Ok(()) => {}
        Err(e) if e.kind == ErrorKind::NotFound => {
            warn!(
                file_id = %file.id,
                storage_path = %file.storage_path,
                "Stored object already missing"
            );
        }
        Err(e) => {
            warn!(
                file_id = %file.id,
                storage_path = %file.storage_path,
                error = %e,
                "Failed to remove stored object"
            );
            outcome.storage_failures.push(StorageFailure {
                file_id: file.id,
                storage_path: file.storage_path.clone(),
                message: e.message,
            });
        }
    }

    if repo.delete_file(file.id).await? {
        outcome.files_deleted += 1;
    }
    Ok(())
}
