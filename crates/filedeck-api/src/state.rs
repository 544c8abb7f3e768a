//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use filedeck_core::config::AppConfig;
use filedeck_core::traits::StorageProvider;
use filedeck_database::TreeRepository;
use filedeck_service::{
    DownloadService, FileService, FolderService, TreeService, UploadService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Folder and file metadata persistence
    pub repo: Arc<dyn TreeRepository>,
    /// File content storage
    pub storage: Arc<dyn StorageProvider>,

    /// Folder CRUD and recursive delete
    pub folder_service: Arc<FolderService>,
    /// File metadata operations
    pub file_service: Arc<FileService>,
    /// File uploads
    pub upload_service: Arc<UploadService>,
    /// File downloads
    pub download_service: Arc<DownloadService>,
    /// Subtree and breadcrumb views
    pub tree_service: Arc<TreeService>,
}

impl AppState {
    /// Wires every service over one repository and one storage provider.
    pub fn new(
        config: AppConfig,
        repo: Arc<dyn TreeRepository>,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        let folder_service = Arc::new(FolderService::new(Arc::clone(&repo), Arc::clone(&storage)));
        let file_service = Arc::new(FileService::new(Arc::clone(&repo), Arc::clone(&storage)));
        let upload_service = Arc::new(UploadService::new(
            Arc::clone(&repo),
            Arc::clone(&storage),
            config.storage.clone(),
        ));
        let download_service = Arc::new(DownloadService::new(
            Arc::clone(&repo),
            Arc::clone(&storage),
        ));
        let tree_service = Arc::new(TreeService::new(Arc::clone(&repo)));

        Self {
            config: Arc::new(config),
            repo,
            storage,
            folder_service,
            file_service,
            upload_service,
            download_service,
            tree_service,
        }
    }
}
