//! Typed client for the FileDeck HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use filedeck_core::config::ClientConfig;
use filedeck_core::error::{AppError, ErrorKind};
use filedeck_core::result::AppResult;
use filedeck_entity::folder::{Folder, FolderNode};

use crate::models::{
    DeleteReport, Envelope, ErrorBody, FileInfo, FolderContents, HealthInfo, RootContents,
};
use crate::source::{ProgressFn, UploadSource};
use crate::transfer::Uploader;

/// Header carrying the acting owner's id.
const OWNER_HEADER: &str = "X-Owner-Id";

/// Path prefix of the versioned API, stripped to reach `/health`.
const API_PREFIX: &str = "/api/v1";

/// HTTP client bound to one server and one owner.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    owner_id: Uuid,
}

impl ApiClient {
    /// Creates a client with the transport's default timeouts.
    pub fn new(base_url: impl Into<String>, owner_id: Uuid) -> AppResult<Self> {
        Self::build(base_url.into(), owner_id, None)
    }

    /// Creates a client from the `[client]` configuration section.
    pub fn from_config(config: &ClientConfig) -> AppResult<Self> {
        let owner = config
            .owner_id
            .as_deref()
            .ok_or_else(|| AppError::configuration("client.owner_id is not set"))?;
        let owner_id = Uuid::parse_str(owner.trim())
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "client.owner_id is not a UUID", e))?;

        Self::build(
            config.base_url.clone(),
            owner_id,
            config.request_timeout_seconds.map(Duration::from_secs),
        )
    }

    fn build(base_url: String, owner_id: Uuid, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("filedeck-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
        })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            owner_id,
        })
    }

    /// The owner every request acts as.
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(OWNER_HEADER, self.owner_id.to_string())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = check(request.send().await.map_err(transport_error)?).await?;
        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Malformed API response", e)
        })?;
        Ok(envelope.data)
    }

    // ── Health ───────────────────────────────────────────────

    /// Server health. A degraded server still answers with its report.
    pub async fn health(&self) -> AppResult<HealthInfo> {
        let root = self
            .base_url
            .strip_suffix(API_PREFIX)
            .unwrap_or(&self.base_url);
        let response = self
            .http
            .get(format!("{root}/health"))
            .send()
            .await
            .map_err(transport_error)?;
        let envelope: Envelope<HealthInfo> = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Malformed health response", e)
        })?;
        Ok(envelope.data)
    }

    // ── Folders ──────────────────────────────────────────────

    /// Root folders and root files of the owner.
    pub async fn list_root(&self) -> AppResult<RootContents> {
        self.send(self.request(Method::GET, "/files")).await
    }

    /// A folder and its direct children.
    pub async fn list_folder(&self, folder_id: Uuid) -> AppResult<FolderContents> {
        self.send(self.request(Method::GET, &format!("/folders/{folder_id}")))
            .await
    }

    /// Creates a folder under `parent_id`, or at root level.
    pub async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<Uuid>,
        is_public: bool,
    ) -> AppResult<Folder> {
        self.send(self.request(Method::POST, "/folders").json(&json!({
            "name": name,
            "parent_id": parent_id,
            "is_public": is_public,
        })))
        .await
    }

    pub async fn rename_folder(&self, folder_id: Uuid, new_name: &str) -> AppResult<Folder> {
        self.send(
            self.request(Method::PUT, &format!("/folders/{folder_id}/rename"))
                .json(&json!({ "new_name": new_name })),
        )
        .await
    }

    pub async fn move_folder(&self, folder_id: Uuid, target: Option<Uuid>) -> AppResult<Folder> {
        self.send(
            self.request(Method::PUT, &format!("/folders/{folder_id}/move"))
                .json(&json!({ "target_folder_id": target })),
        )
        .await
    }

    pub async fn set_folder_visibility(&self, folder_id: Uuid, is_public: bool) -> AppResult<Folder> {
        self.send(
            self.request(Method::PATCH, &format!("/folders/{folder_id}"))
                .json(&json!({ "op": "set_visibility", "is_public": is_public })),
        )
        .await
    }

    /// Deletes a folder. A non-empty folder without `recursive` fails with
    /// `NotEmpty`, carrying `subfolder_count` and `file_count` details.
    pub async fn delete_folder(&self, folder_id: Uuid, recursive: bool) -> AppResult<DeleteReport> {
        self.send(self.request(
            Method::DELETE,
            &format!("/folders/{folder_id}?recursive={recursive}"),
        ))
        .await
    }

    /// Folders from the root down to `folder_id`.
    pub async fn breadcrumbs(&self, folder_id: Uuid) -> AppResult<Vec<Folder>> {
        self.send(self.request(Method::GET, &format!("/folders/{folder_id}/breadcrumbs")))
            .await
    }

    pub async fn tree(&self, folder_id: Uuid) -> AppResult<FolderNode> {
        self.send(self.request(Method::GET, &format!("/folders/{folder_id}/tree")))
            .await
    }

    // ── Files ────────────────────────────────────────────────

    pub async fn get_file(&self, file_id: Uuid) -> AppResult<FileInfo> {
        self.send(self.request(Method::GET, &format!("/files/{file_id}")))
            .await
    }

    pub async fn rename_file(&self, file_id: Uuid, new_name: &str) -> AppResult<FileInfo> {
        self.send(
            self.request(Method::PUT, &format!("/files/{file_id}/rename"))
                .json(&json!({ "new_name": new_name })),
        )
        .await
    }

    pub async fn move_file(&self, file_id: Uuid, target: Option<Uuid>) -> AppResult<FileInfo> {
        self.send(
            self.request(Method::PUT, &format!("/files/{file_id}/move"))
                .json(&json!({ "target_folder_id": target })),
        )
        .await
    }

    pub async fn set_file_visibility(&self, file_id: Uuid, is_public: bool) -> AppResult<FileInfo> {
        self.send(
            self.request(Method::PATCH, &format!("/files/{file_id}"))
                .json(&json!({ "is_public": is_public })),
        )
        .await
    }

    pub async fn delete_file(&self, file_id: Uuid) -> AppResult<DeleteReport> {
        self.send(self.request(Method::DELETE, &format!("/files/{file_id}")))
            .await
    }

    /// Downloads file content.
    pub async fn download(&self, file_id: Uuid) -> AppResult<Bytes> {
        let response = self
            .request(Method::GET, &format!("/files/{file_id}/download"))
            .send()
            .await
            .map_err(transport_error)?;
        check(response)
            .await?
            .bytes()
            .await
            .map_err(transport_error)
    }

    /// Uploads a file as multipart form data, reporting progress as the
    /// body is streamed.
    pub async fn upload_file(
        &self,
        folder_id: Option<Uuid>,
        source: &UploadSource,
        progress: ProgressFn,
    ) -> AppResult<FileInfo> {
        let body = Body::wrap_stream(source.progress_stream(progress));
        let mut part = Part::stream_with_length(body, source.size()).file_name(source.name.clone());
        if let Some(mime) = &source.mime_type {
            part = part
                .mime_str(mime)
                .map_err(|e| AppError::with_source(ErrorKind::Validation, format!("Invalid content type '{mime}'"), e))?;
        }

        let mut form = Form::new();
        if let Some(folder_id) = folder_id {
            form = form.text("folder_id", folder_id.to_string());
        }
        let form = form.part("file", part);

        debug!(name = %source.name, size = source.size(), folder_id = ?folder_id, "Uploading file");
        self.send(self.request(Method::POST, "/files").multipart(form))
            .await
    }
}

#[async_trait]
impl Uploader for ApiClient {
    async fn upload(
        &self,
        folder_id: Option<Uuid>,
        source: &UploadSource,
        progress: ProgressFn,
    ) -> AppResult<Uuid> {
        self.upload_file(folder_id, source, progress)
            .await
            .map(|file| file.id)
    }
}

async fn check(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(decode_error(status, &body))
}

/// Rebuilds the server's error from a non-success response.
fn decode_error(status: StatusCode, body: &str) -> AppError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let kind = ErrorKind::from_code(&parsed.error).unwrap_or_else(|| kind_for_status(status));
            let err = AppError::new(kind, parsed.message);
            match parsed.details {
                Some(details) => err.with_details(details),
                None => err,
            }
        }
        Err(_) => AppError::new(kind_for_status(status), format!("HTTP {status}: {body}")),
    }
}

fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => ErrorKind::Validation,
        StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
        StatusCode::SERVICE_UNAVAILABLE => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::Internal,
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::ServiceUnavailable, format!("Request failed: {e}"), e)
}
