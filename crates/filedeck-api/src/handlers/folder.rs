//! Folder CRUD, move, delete, and tree handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use filedeck_entity::folder::{Folder, FolderNode};
use filedeck_service::DeleteOutcome;
use filedeck_service::folder::CreateFolderRequest as SvcCreateFolder;

use crate::dto::request::{
    CreateFolderRequest, DeleteFolderQuery, FolderPatchRequest, MoveRequest, RenameRequest,
};
use crate::dto::response::{ApiResponse, FolderListingResponse};
use crate::error::ApiError;
use crate::extractors::{IdPath, Owner, ValidQuery, ValidatedJson};
use crate::state::AppState;

/// POST /api/v1/folders
pub async fn create_folder(
    State(state): State<AppState>,
    owner: Owner,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Folder>>), ApiError> {
    let folder = state
        .folder_service
        .create_folder(
            &owner,
            SvcCreateFolder {
                name: req.name,
                parent_id: req.parent_id,
                is_public: req.is_public,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// GET /api/v1/folders/{id}
pub async fn list_folder(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<FolderListingResponse>>, ApiError> {
    let listing = state.folder_service.list_folder(&owner, id).await?;
    Ok(Json(ApiResponse::ok(listing.into())))
}

/// PATCH /api/v1/folders/{id}
pub async fn patch_folder(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<FolderPatchRequest>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    let svc = &state.folder_service;
    let folder = match req {
        FolderPatchRequest::Rename(r) => svc.rename_folder(&owner, id, &r.new_name).await?,
        FolderPatchRequest::Move(m) => svc.move_folder(&owner, id, m.target_folder_id).await?,
        FolderPatchRequest::SetVisibility(v) => {
            svc.set_visibility(&owner, id, v.is_public).await?
        }
    };

    Ok(Json(ApiResponse::ok(folder)))
}

/// PUT /api/v1/folders/{id}/rename
pub async fn rename_folder(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<RenameRequest>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    let folder = state
        .folder_service
        .rename_folder(&owner, id, &req.new_name)
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// PUT /api/v1/folders/{id}/move
pub async fn move_folder(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<MoveRequest>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    let folder = state
        .folder_service
        .move_folder(&owner, id, req.target_folder_id)
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// DELETE /api/v1/folders/{id}?recursive=bool
pub async fn delete_folder(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
    ValidQuery(query): ValidQuery<DeleteFolderQuery>,
) -> Result<Json<ApiResponse<DeleteOutcome>>, ApiError> {
    let outcome = state
        .folder_service
        .delete_folder(&owner, id, query.recursive)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /api/v1/folders/{id}/breadcrumbs
pub async fn breadcrumbs(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<Vec<Folder>>>, ApiError> {
    let chain = state.tree_service.breadcrumbs(&owner, id).await?;
    Ok(Json(ApiResponse::ok(chain)))
}

/// GET /api/v1/folders/{id}/tree
pub async fn get_tree(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<FolderNode>>, ApiError> {
    let tree = state.tree_service.get_tree(&owner, id).await?;
    Ok(Json(ApiResponse::ok(tree)))
}
