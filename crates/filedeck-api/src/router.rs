//! Route definitions for the FileDeck HTTP API.
//!
//! Tree and file routes are mounted under `/api/v1`; `/health` sits at
//! the top level. The router receives `AppState` and passes it to all
//! handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Multipart framing overhead allowed on top of the upload size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the Axum router with all routes and request logging.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.storage.max_upload_size_bytes as usize + MULTIPART_OVERHEAD_BYTES;

    let api_routes = Router::new().merge(file_routes()).merge(folder_routes());

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Root listing, upload, download, and file metadata
fn file_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            get(handlers::file::list_root).post(handlers::file::upload_file),
        )
        .route(
            "/files/{id}",
            get(handlers::file::get_file)
                .patch(handlers::file::patch_file)
                .delete(handlers::file::delete_file),
        )
        .route("/files/{id}/download", get(handlers::file::download_file))
        .route("/files/{id}/rename", put(handlers::file::rename_file))
        .route("/files/{id}/move", put(handlers::file::move_file))
}

/// Folder CRUD, move, delete, breadcrumbs, and subtree
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(handlers::folder::create_folder))
        .route(
            "/folders/{id}",
            get(handlers::folder::list_folder)
                .patch(handlers::folder::patch_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route("/folders/{id}/rename", put(handlers::folder::rename_folder))
        .route("/folders/{id}/move", put(handlers::folder::move_folder))
        .route(
            "/folders/{id}/breadcrumbs",
            get(handlers::folder::breadcrumbs),
        )
        .route("/folders/{id}/tree", get(handlers::folder::get_tree))
}
