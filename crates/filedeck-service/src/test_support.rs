//! Shared fixtures for service tests.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;
use uuid::Uuid;

use filedeck_core::config::StorageConfig;
use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;
use filedeck_core::traits::StorageProvider;
use filedeck_database::MemoryTreeRepository;
use filedeck_entity::file::File;
use filedeck_entity::folder::Folder;
use filedeck_storage::LocalStorageProvider;

use crate::context::RequestContext;
use crate::file::{DownloadService, FileService, UploadParams, UploadService};
use crate::folder::{CreateFolderRequest, FolderService, TreeService};

/// Local storage that can be told to fail writes or deletes.
#[derive(Debug)]
struct FaultyStorage {
    inner: LocalStorageProvider,
    fail_writes: bool,
    fail_deletes: bool,
}

#[async_trait]
impl StorageProvider for FaultyStorage {
    fn provider_type(&self) -> &str {
        "faulty"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<String> {
        if self.fail_writes {
            return Err(AppError::storage("disk full"));
        }
        self.inner.write(path, data).await
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.inner.read_bytes(path).await
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        if self.fail_deletes {
            return Err(AppError::storage("permission denied"));
        }
        self.inner.delete(path).await
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        self.inner.exists(path).await
    }
}

/// Services wired over an in-memory repository and a temp-dir store.
pub(crate) struct Harness {
    _dir: TempDir,
    root: PathBuf,
    pub ctx: RequestContext,
    pub other: RequestContext,
    pub repo: Arc<MemoryTreeRepository>,
    pub storage: Arc<dyn StorageProvider>,
    pub folders: FolderService,
    pub files: FileService,
    pub uploads: UploadService,
    pub downloads: DownloadService,
    pub tree: TreeService,
}

impl Harness {
    pub const MAX_UPLOAD: u64 = 1024;

    pub async fn new() -> Self {
        Self::build(false, false).await
    }

    pub async fn with_failing_writes() -> Self {
        Self::build(true, false).await
    }

    pub async fn with_failing_deletes() -> Self {
        Self::build(false, true).await
    }

    async fn build(fail_writes: bool, fail_deletes: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let inner = LocalStorageProvider::new(&root).await.unwrap();
        let storage: Arc<dyn StorageProvider> = Arc::new(FaultyStorage {
            inner,
            fail_writes,
            fail_deletes,
        });
        let repo = Arc::new(MemoryTreeRepository::new());
        let config = StorageConfig {
            max_upload_size_bytes: Self::MAX_UPLOAD,
            ..StorageConfig::default()
        };

        Self {
            _dir: dir,
            root,
            ctx: RequestContext::new(Uuid::new_v4()),
            other: RequestContext::new(Uuid::new_v4()),
            folders: FolderService::new(repo.clone(), storage.clone()),
            files: FileService::new(repo.clone(), storage.clone()),
            uploads: UploadService::new(repo.clone(), storage.clone(), config),
            downloads: DownloadService::new(repo.clone(), storage.clone()),
            tree: TreeService::new(repo.clone()),
            repo,
            storage,
        }
    }

    pub async fn mkdir(&self, name: &str, parent_id: Option<Uuid>) -> Folder {
        self.folders
            .create_folder(
                &self.ctx,
                CreateFolderRequest {
                    name: name.to_string(),
                    parent_id,
                    is_public: false,
                },
            )
            .await
            .unwrap()
    }

    pub async fn upload(&self, folder_id: Option<Uuid>, name: &str, content: &str) -> File {
        self.uploads
            .upload(
                &self.ctx,
                UploadParams {
                    folder_id,
                    file_name: name.to_string(),
                    mime_type: None,
                    data: Bytes::from(content.to_string()),
                },
            )
            .await
            .unwrap()
    }

    pub fn stored_object_count(&self) -> usize {
        std::fs::read_dir(&self.root).unwrap().count()
    }
}
