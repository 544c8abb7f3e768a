//! Single-request file upload.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use filedeck_core::config::StorageConfig;
use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;
use filedeck_core::traits::StorageProvider;
use filedeck_database::TreeRepository;
use filedeck_entity::file::{CreateFile, File, resolve_mime};
use filedeck_storage::storage_path_for;

use crate::context::RequestContext;
use crate::validation::normalize_name;

/// Upload parameters (single request with full file body).
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Target folder (None for root level).
    pub folder_id: Option<Uuid>,
    /// File name as sent by the client.
    pub file_name: String,
    /// MIME type as sent by the client.
    pub mime_type: Option<String>,
    /// File content bytes.
    pub data: Bytes,
}

/// Handles file uploads.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Tree persistence.
    repo: Arc<dyn TreeRepository>,
    /// Content storage.
    storage: Arc<dyn StorageProvider>,
    /// Storage configuration.
    config: StorageConfig,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        repo: Arc<dyn TreeRepository>,
        storage: Arc<dyn StorageProvider>,
        config: StorageConfig,
    ) -> Self {
        Self {
            repo,
            storage,
            config,
        }
    }

    /// Stores the content, then records the file.
    ///
    /// A storage failure aborts the upload before any record exists. If the
    /// record cannot be written, the stored object is removed best-effort.
    pub async fn upload(&self, ctx: &RequestContext, params: UploadParams) -> AppResult<File> {
        let name = normalize_name("File", &params.file_name)?;
        if params.data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        if let Some(folder_id) = params.folder_id {
            self.repo
                .find_folder(folder_id)
                .await?
                .filter(|f| ctx.owns(f.owner_id))
                .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        }

        let mime_type = resolve_mime(&name, params.mime_type.as_deref());
        let size_bytes = params.data.len() as i64;
        let storage_path = self
            .storage
            .write(&storage_path_for(&name), params.data)
            .await?;

        let record = CreateFile {
            folder_id: params.folder_id,
            name: name.clone(),
            original_name: name,
            mime_type,
            size_bytes,
            storage_path: storage_path.clone(),
            owner_id: ctx.owner_id,
            is_public: false,
        };

        let file = match self.repo.insert_file(record).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&storage_path).await {
                    warn!(
                        storage_path = %storage_path,
                        error = %cleanup,
                        "Failed to remove stored object after record insert failed"
                    );
                }
                return Err(e);
            }
        };

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file.id,
            name = %file.name,
            kind = %file.kind,
            size = file.size_bytes,
            "Upload completed"
        );

        Ok(file)
    }
}
