//! Test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use filedeck_api::{AppState, build_app};
use filedeck_core::config::AppConfig;
use filedeck_database::{MemoryTreeRepository, TreeRepository};
use filedeck_storage::LocalStorageProvider;

const BOUNDARY: &str = "filedeck-test-boundary";

/// Maximum upload size configured for the test app.
pub const MAX_UPLOAD: u64 = 1024;

/// A FileDeck router over an in-memory tree and a temp-dir store.
pub struct TestApp {
    pub router: Router,
    /// Primary test owner.
    pub owner: Uuid,
    /// A second owner for isolation checks.
    pub other: Uuid,
    storage_root: PathBuf,
    _dir: TempDir,
}

/// Response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage_root = dir.path().join("objects");

        let mut config = AppConfig::default();
        config.storage.root_path = storage_root.to_string_lossy().into_owned();
        config.storage.max_upload_size_bytes = MAX_UPLOAD;

        let repo: Arc<dyn TreeRepository> = Arc::new(MemoryTreeRepository::new());
        let storage = LocalStorageProvider::new(&storage_root)
            .await
            .expect("local storage");

        let state = AppState::new(config, repo, Arc::new(storage));

        Self {
            router: build_app(state),
            owner: Uuid::new_v4(),
            other: Uuid::new_v4(),
            storage_root,
            _dir: dir,
        }
    }

    /// Send a JSON request as `owner`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        owner: Option<Uuid>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(owner) = owner {
            builder = builder.header("X-Owner-Id", owner.to_string());
        }

        let body = match body {
            Some(json) => Body::from(serde_json::to_vec(&json).expect("json body")),
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("request")).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None, Some(self.owner)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body), Some(self.owner))
            .await
    }

    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, path, Some(body), Some(self.owner))
            .await
    }

    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, path, Some(body), Some(self.owner))
            .await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, None, Some(self.owner))
            .await
    }

    /// Create a folder and return its id.
    pub async fn mkdir(&self, name: &str, parent_id: Option<Uuid>) -> Uuid {
        let resp = self
            .post(
                "/api/v1/folders",
                serde_json::json!({ "name": name, "parent_id": parent_id }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "mkdir {name}: {:?}", resp.body);
        id_of(resp.data())
    }

    /// Upload `content` as `file_name` through a multipart POST.
    ///
    /// The part carries no content type, so the server guesses it from the name.
    pub async fn upload(
        &self,
        folder_id: Option<Uuid>,
        file_name: &str,
        content: &[u8],
    ) -> TestResponse {
        let mut body = Vec::new();
        if let Some(folder_id) = folder_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"folder_id\"\r\n\r\n{folder_id}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/files")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("X-Owner-Id", self.owner.to_string())
            .body(Body::from(body))
            .expect("request");

        self.send(req).await
    }

    /// Number of objects currently held by the local store.
    pub fn stored_object_count(&self) -> usize {
        std::fs::read_dir(&self.storage_root)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(req).await.expect("response");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body")
            .to_vec();
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Parse the `id` member of a JSON record.
pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("record id")
}

/// Names of the records in a JSON array.
pub fn names(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
