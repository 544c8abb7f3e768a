//! File listing, upload, download, and metadata handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use filedeck_core::error::AppError;
use filedeck_service::DeleteOutcome;
use filedeck_service::file::{UpdateFileRequest, UploadParams};

use crate::dto::request::{FilePatchRequest, MoveRequest, RenameRequest};
use crate::dto::response::{ApiResponse, FileResponse, RootListingResponse};
use crate::error::ApiError;
use crate::extractors::path::parse_uuid;
use crate::extractors::{IdPath, Owner, ValidatedJson};
use crate::state::AppState;

/// GET /api/v1/files
///
/// Root level of the caller's tree: root folders and root files.
pub async fn list_root(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<ApiResponse<RootListingResponse>>, ApiError> {
    let listing = state.folder_service.list_root(&owner).await?;
    Ok(Json(ApiResponse::ok(listing.into())))
}

/// POST /api/v1/files (multipart: `file`, optional `folder_id`)
pub async fn upload_file(
    State(state): State<AppState>,
    owner: Owner,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut folder_id: Option<Uuid> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "folder_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    folder_id = Some(parse_uuid(text)?);
                }
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                mime_type = field.content_type().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let file_name = file_name.ok_or_else(|| AppError::validation("file is required"))?;
    let data = data.ok_or_else(|| AppError::validation("file data is required"))?;

    let file = state
        .upload_service
        .upload(
            &owner,
            UploadParams {
                folder_id,
                file_name,
                mime_type,
                data,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file.into()))))
}

/// GET /api/v1/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state.file_service.get_file(&owner, id).await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// PATCH /api/v1/files/{id}
pub async fn patch_file(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<FilePatchRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state
        .file_service
        .update_file(
            &owner,
            id,
            UpdateFileRequest {
                name: req.name,
                is_public: req.is_public,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// PUT /api/v1/files/{id}/rename
pub async fn rename_file(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<RenameRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state
        .file_service
        .rename_file(&owner, id, &req.new_name)
        .await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// PUT /api/v1/files/{id}/move
pub async fn move_file(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<MoveRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state
        .file_service
        .move_file(&owner, id, req.target_folder_id)
        .await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// DELETE /api/v1/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<DeleteOutcome>>, ApiError> {
    let outcome = state.file_service.delete_file(&owner, id).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /api/v1/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    owner: Owner,
    IdPath(id): IdPath,
) -> Result<Response, ApiError> {
    let result = state.download_service.download(&owner, id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                result.filename.replace(['"', '\\'], "_")
            ),
        )
        .header(header::CONTENT_LENGTH, result.data.len())
        .body(Body::from(result.data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
