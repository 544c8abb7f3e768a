//! Integration tests for folder endpoints.

mod helpers;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use helpers::{TestApp, id_of, names};

#[tokio::test]
async fn test_missing_owner_header_is_unauthorized() {
    let app = TestApp::new().await;
    let resp = app.request(Method::GET, "/api/v1/files", None, None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_owner_header_is_rejected() {
    let app = TestApp::new().await;
    let req = axum::http::Request::builder()
        .uri("/api/v1/files")
        .header("X-Owner-Id", "not-a-uuid")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = tower::ServiceExt::oneshot(app.router.clone(), req)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_folder_and_sibling_conflict() {
    let app = TestApp::new().await;

    let resp = app
        .post("/api/v1/folders", json!({ "name": "Docs" }))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.data()["name"], "Docs");
    assert!(resp.data()["parent_id"].is_null());
    assert_eq!(resp.data()["owner_id"], app.owner.to_string());

    let resp = app
        .post("/api/v1/folders", json!({ "name": "Docs" }))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.error_code(), "CONFLICT");

    // Same name under a different parent is fine.
    let work = app.mkdir("Work", None).await;
    app.mkdir("Docs", Some(work)).await;

    // Another owner has their own namespace.
    let resp = app
        .request(
            Method::POST,
            "/api/v1/folders",
            Some(json!({ "name": "Docs" })),
            Some(app.other),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_folder_validation() {
    let app = TestApp::new().await;

    let resp = app.post("/api/v1/folders", json!({ "name": "" })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "VALIDATION");

    let resp = app
        .post(
            "/api/v1/folders",
            json!({ "name": "Orphan", "parent_id": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_root_and_folder() {
    let app = TestApp::new().await;
    let docs = app.mkdir("Docs", None).await;
    app.mkdir("Archive", None).await;
    app.mkdir("2024", Some(docs)).await;

    let resp = app.get("/api/v1/files").await;
    assert_eq!(resp.status, StatusCode::OK);
    let mut root = names(&resp.data()["folders"]);
    root.sort();
    assert_eq!(root, vec!["Archive", "Docs"]);

    let resp = app.get(&format!("/api/v1/folders/{docs}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["folder"]["name"], "Docs");
    assert_eq!(names(&resp.data()["subfolders"]), vec!["2024"]);
    assert!(resp.data()["files"].as_array().unwrap().is_empty());

    let resp = app.get(&format!("/api/v1/folders/{}", Uuid::new_v4())).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rename_folder() {
    let app = TestApp::new().await;
    let docs = app.mkdir("Docs", None).await;
    app.mkdir("Reports", None).await;

    let resp = app
        .put(
            &format!("/api/v1/folders/{docs}/rename"),
            json!({ "new_name": "Papers" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["name"], "Papers");

    let resp = app
        .put(
            &format!("/api/v1/folders/{docs}/rename"),
            json!({ "new_name": "Reports" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let resp = app.get(&format!("/api/v1/folders/{docs}")).await;
    assert_eq!(resp.data()["folder"]["name"], "Papers");
}

#[tokio::test]
async fn test_move_folder_rejects_cycles() {
    let app = TestApp::new().await;
    let docs = app.mkdir("Docs", None).await;
    let work = app.mkdir("Work", Some(docs)).await;

    let resp = app
        .put(
            &format!("/api/v1/folders/{docs}/move"),
            json!({ "target_folder_id": work }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "INVALID_OPERATION");

    let resp = app
        .put(
            &format!("/api/v1/folders/{docs}/move"),
            json!({ "target_folder_id": docs }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    // Moving Work back to the root is allowed.
    let resp = app
        .put(
            &format!("/api/v1/folders/{work}/move"),
            json!({ "target_folder_id": null }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.data()["parent_id"].is_null());
}

#[tokio::test]
async fn test_move_folder_into_sibling_with_same_name_conflicts() {
    let app = TestApp::new().await;
    let a = app.mkdir("A", None).await;
    app.mkdir("Shared", Some(a)).await;
    let shared = app.mkdir("Shared", None).await;

    let resp = app
        .put(
            &format!("/api/v1/folders/{shared}/move"),
            json!({ "target_folder_id": a }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_patch_folder_ops() {
    let app = TestApp::new().await;
    let docs = app.mkdir("Docs", None).await;
    let archive = app.mkdir("Archive", None).await;

    let resp = app
        .patch(
            &format!("/api/v1/folders/{docs}"),
            json!({ "op": "rename", "new_name": "Notes" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["name"], "Notes");

    let resp = app
        .patch(
            &format!("/api/v1/folders/{docs}"),
            json!({ "op": "move", "target_folder_id": archive }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["parent_id"], archive.to_string());

    let resp = app
        .patch(
            &format!("/api/v1/folders/{docs}"),
            json!({ "op": "set_visibility", "is_public": true }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["is_public"], true);

    let resp = app
        .patch(&format!("/api/v1/folders/{docs}"), json!({ "op": "copy" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_non_empty_then_recursive() {
    let app = TestApp::new().await;
    let docs = app.mkdir("Docs", None).await;
    let work = app.mkdir("Work", Some(docs)).await;
    let upload = app.upload(Some(work), "plan.txt", b"q3 plan").await;
    assert_eq!(upload.status, StatusCode::CREATED);
    assert_eq!(app.stored_object_count(), 1);

    let resp = app.delete(&format!("/api/v1/folders/{docs}")).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.error_code(), "NOT_EMPTY");
    assert_eq!(resp.body["details"]["subfolder_count"], 1);
    assert_eq!(resp.body["details"]["file_count"], 0);
    assert_eq!(resp.body["details"]["has_contents"], true);

    // Nothing was removed.
    let resp = app.get(&format!("/api/v1/folders/{work}")).await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .delete(&format!("/api/v1/folders/{docs}?recursive=true"))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["folders_deleted"], 2);
    assert_eq!(resp.data()["files_deleted"], 1);
    assert!(resp.data()["storage_failures"].as_array().unwrap().is_empty());
    assert_eq!(app.stored_object_count(), 0);

    for id in [docs, work] {
        let resp = app.get(&format!("/api/v1/folders/{id}")).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
    }
    let resp = app.get("/api/v1/files").await;
    assert!(resp.data()["folders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_empty_folder() {
    let app = TestApp::new().await;
    let docs = app.mkdir("Docs", None).await;

    let resp = app.delete(&format!("/api/v1/folders/{docs}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["folders_deleted"], 1);
    assert_eq!(resp.data()["files_deleted"], 0);
}

#[tokio::test]
async fn test_breadcrumbs_and_tree() {
    let app = TestApp::new().await;
    let a = app.mkdir("A", None).await;
    let b = app.mkdir("B", Some(a)).await;
    let c = app.mkdir("C", Some(b)).await;
    app.mkdir("D", Some(a)).await;
    app.upload(Some(b), "note.txt", b"hi").await;

    let resp = app.get(&format!("/api/v1/folders/{c}/breadcrumbs")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(names(resp.data()), vec!["A", "B", "C"]);

    let resp = app.get(&format!("/api/v1/folders/{a}/tree")).await;
    assert_eq!(resp.status, StatusCode::OK);
    let tree = resp.data();
    assert_eq!(tree["name"], "A");
    assert_eq!(tree["depth"], 0);
    assert_eq!(tree["child_count"], 2);

    let children = tree["children"].as_array().unwrap();
    let b_node = children
        .iter()
        .find(|n| n["name"] == "B")
        .expect("B in tree");
    assert_eq!(id_of(b_node), b);
    assert_eq!(b_node["depth"], 1);
    assert_eq!(b_node["file_count"], 1);
    assert_eq!(names(&b_node["children"]), vec!["C"]);
}

#[tokio::test]
async fn test_other_owner_sees_only_public_folders() {
    let app = TestApp::new().await;
    let private = app.mkdir("Private", None).await;
    let public = app.mkdir("Public", None).await;
    app.patch(
        &format!("/api/v1/folders/{public}"),
        json!({ "op": "set_visibility", "is_public": true }),
    )
    .await;

    let resp = app
        .request(
            Method::GET,
            &format!("/api/v1/folders/{private}"),
            None,
            Some(app.other),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app
        .request(
            Method::GET,
            &format!("/api/v1/folders/{public}"),
            None,
            Some(app.other),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    // Public records are read-only for others.
    let resp = app
        .request(
            Method::PUT,
            &format!("/api/v1/folders/{public}/rename"),
            Some(json!({ "new_name": "Mine" })),
            Some(app.other),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app
        .request(
            Method::DELETE,
            &format!("/api/v1/folders/{public}"),
            None,
            Some(app.other),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_and_query_return_error_bodies() {
    let app = TestApp::new().await;
    let docs = app.mkdir("Docs", None).await;

    let resp = app.get("/api/v1/folders/not-a-uuid").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "VALIDATION");
    assert_eq!(resp.body["message"], "Invalid UUID: not-a-uuid");

    let resp = app.get("/api/v1/files/123/download").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "VALIDATION");

    let resp = app
        .delete(&format!("/api/v1/folders/{docs}?recursive=yes"))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "VALIDATION");

    // The folder is untouched.
    let resp = app.get(&format!("/api/v1/folders/{docs}")).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_tree_views_hide_private_folders_from_others() {
    let app = TestApp::new().await;
    let secret_root = app.mkdir("SecretRoot", None).await;
    let resp = app
        .post(
            "/api/v1/folders",
            json!({ "name": "Shared", "parent_id": secret_root, "is_public": true }),
        )
        .await;
    let shared = id_of(resp.data());
    app.mkdir("HiddenChild", Some(shared)).await;

    let app = &app;
    let get_as_other = |path: String| async move {
        app.request(Method::GET, &path, None, Some(app.other)).await
    };

    let resp = get_as_other(format!("/api/v1/folders/{shared}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(names(&resp.data()["subfolders"]).is_empty());

    let resp = get_as_other(format!("/api/v1/folders/{shared}/tree")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(names(&resp.data()["children"]).is_empty());
    assert_eq!(resp.data()["child_count"], 0);

    let resp = get_as_other(format!("/api/v1/folders/{shared}/breadcrumbs")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(names(resp.data()), vec!["Shared"]);

    let resp = get_as_other(format!("/api/v1/folders/{secret_root}/tree")).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
