//! File download.

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use filedeck_core::error::{AppError, ErrorKind};
use filedeck_core::result::AppResult;
use filedeck_core::traits::StorageProvider;
use filedeck_database::TreeRepository;
use filedeck_entity::file::File;

use crate::context::RequestContext;

/// File metadata and content for a download.
#[derive(Debug)]
pub struct DownloadResult {
    /// File metadata.
    pub file: File,
    /// File content bytes.
    pub data: Bytes,
    /// MIME type for Content-Type header.
    pub content_type: String,
    /// Suggested filename for Content-Disposition.
    pub filename: String,
}

/// Reads file content for readers of the file.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// Tree persistence.
    repo: Arc<dyn TreeRepository>,
    /// Content storage.
    storage: Arc<dyn StorageProvider>,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(repo: Arc<dyn TreeRepository>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { repo, storage }
    }

    /// Loads a file's content.
    ///
    /// A record whose stored object is gone surfaces as a storage failure,
    /// not as a missing file.
    pub async fn download(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<DownloadResult> {
        let file = self
            .repo
            .find_file(file_id)
            .await?
            .filter(|f| f.is_readable_by(ctx.owner_id))
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        let data = self
            .storage
            .read_bytes(&file.storage_path)
            .await
            .map_err(|e| match e.kind {
                ErrorKind::NotFound => AppError::storage(format!(
                    "Content for file {file_id} is missing from storage"
                )),
                _ => e,
            })?;

        Ok(DownloadResult {
            content_type: file.mime_type.clone(),
            filename: file.name.clone(),
            file,
            data,
        })
    }
}
