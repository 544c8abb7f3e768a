//! Integration tests for file endpoints and health.

mod helpers;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use helpers::{MAX_UPLOAD, TestApp, id_of, names};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let resp = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["status"], "ok");
    assert_eq!(resp.data()["database"], "connected");
    assert_eq!(resp.data()["storage"], "available");
}

#[tokio::test]
async fn test_upload_to_root_and_list() {
    let app = TestApp::new().await;

    let resp = app.upload(None, "photo.png", b"png-bytes").await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let file = resp.data();
    assert_eq!(file["name"], "photo.png");
    assert_eq!(file["kind"], "image");
    assert_eq!(file["mime_type"], "image/png");
    assert_eq!(file["size_bytes"], 9);
    assert_eq!(file["size_display"], "9 B");
    assert!(file["folder_id"].is_null());
    assert!(file.get("storage_path").is_none());
    assert_eq!(app.stored_object_count(), 1);

    let resp = app.get("/api/v1/files").await;
    assert_eq!(names(&resp.data()["files"]), vec!["photo.png"]);
}

#[tokio::test]
async fn test_upload_rejections() {
    let app = TestApp::new().await;

    let resp = app
        .upload(Some(Uuid::new_v4()), "a.txt", b"content")
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let big = vec![0u8; MAX_UPLOAD as usize + 1];
    let resp = app.upload(None, "big.bin", &big).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "VALIDATION");

    assert_eq!(app.stored_object_count(), 0);
}

#[tokio::test]
async fn test_download_returns_content_and_headers() {
    let app = TestApp::new().await;
    let docs = app.mkdir("Docs", None).await;
    let resp = app.upload(Some(docs), "notes.txt", b"hello world").await;
    let id = id_of(resp.data());

    let resp = app.get(&format!("/api/v1/files/{id}/download")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.bytes, b"hello world");
    assert!(resp.header("content-type").starts_with("text/plain"));
    assert_eq!(
        resp.header("content-disposition"),
        "attachment; filename=\"notes.txt\""
    );
    assert_eq!(resp.header("content-length"), "11");
}

#[tokio::test]
async fn test_get_rename_and_patch_file() {
    let app = TestApp::new().await;
    let id = id_of(app.upload(None, "draft.txt", b"v1").await.data());
    app.upload(None, "final.txt", b"v2").await;

    let resp = app.get(&format!("/api/v1/files/{id}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["name"], "draft.txt");

    // File names need not be unique among siblings.
    let resp = app
        .put(
            &format!("/api/v1/files/{id}/rename"),
            json!({ "new_name": "final.txt" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["name"], "final.txt");
    assert_eq!(resp.data()["original_name"], "draft.txt");

    let resp = app.get("/api/v1/files").await;
    assert_eq!(names(&resp.data()["files"]), vec!["final.txt", "final.txt"]);

    let resp = app
        .put(
            &format!("/api/v1/files/{id}/rename"),
            json!({ "new_name": "review.txt" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["name"], "review.txt");

    let resp = app
        .put(&format!("/api/v1/files/{id}/rename"), json!({ "new_name": "" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .patch(&format!("/api/v1/files/{id}"), json!({ "is_public": true }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["is_public"], true);
    assert_eq!(resp.data()["name"], "review.txt");
}

#[tokio::test]
async fn test_move_file_between_folders() {
    let app = TestApp::new().await;
    let inbox = app.mkdir("Inbox", None).await;
    let archive = app.mkdir("Archive", None).await;
    let id = id_of(app.upload(Some(inbox), "report.pdf", b"%PDF").await.data());

    let resp = app
        .put(
            &format!("/api/v1/files/{id}/move"),
            json!({ "target_folder_id": archive }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["folder_id"], archive.to_string());

    let resp = app.get(&format!("/api/v1/folders/{inbox}")).await;
    assert!(names(&resp.data()["files"]).is_empty());
    let resp = app.get(&format!("/api/v1/folders/{archive}")).await;
    assert_eq!(names(&resp.data()["files"]), vec!["report.pdf"]);

    let resp = app
        .put(
            &format!("/api/v1/files/{id}/move"),
            json!({ "target_folder_id": null }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.data()["folder_id"].is_null());
    let resp = app.get("/api/v1/files").await;
    assert_eq!(names(&resp.data()["files"]), vec!["report.pdf"]);

    let resp = app
        .put(
            &format!("/api/v1/files/{id}/move"),
            json!({ "target_folder_id": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_file_removes_content() {
    let app = TestApp::new().await;
    let id = id_of(app.upload(None, "tmp.txt", b"scratch").await.data());
    assert_eq!(app.stored_object_count(), 1);

    let resp = app.delete(&format!("/api/v1/files/{id}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["files_deleted"], 1);
    assert_eq!(app.stored_object_count(), 0);

    let resp = app.get(&format!("/api/v1/files/{id}")).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let resp = app.delete(&format!("/api/v1/files/{id}")).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_owner_cannot_reach_private_file() {
    let app = TestApp::new().await;
    let id = id_of(app.upload(None, "secret.txt", b"shh").await.data());

    for (method, path) in [
        (Method::GET, format!("/api/v1/files/{id}")),
        (Method::GET, format!("/api/v1/files/{id}/download")),
        (Method::DELETE, format!("/api/v1/files/{id}")),
    ] {
        let resp = app.request(method, &path, None, Some(app.other)).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "{path}");
    }

    let resp = app
        .request(Method::GET, "/api/v1/files", None, Some(app.other))
        .await;
    assert!(names(&resp.data()["files"]).is_empty());
    assert_eq!(app.stored_object_count(), 1);
}

#[tokio::test]
async fn test_public_file_is_downloadable_by_others() {
    let app = TestApp::new().await;
    let id = id_of(app.upload(None, "readme.md", b"# hi").await.data());
    app.patch(&format!("/api/v1/files/{id}"), json!({ "is_public": true }))
        .await;

    let resp = app
        .request(
            Method::GET,
            &format!("/api/v1/files/{id}/download"),
            None,
            Some(app.other),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.bytes, b"# hi");

    let resp = app
        .request(
            Method::PUT,
            &format!("/api/v1/files/{id}/rename"),
            Some(json!({ "new_name": "mine.md" })),
            Some(app.other),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
