//! End-to-end tests for the image endpoints, running the router over the
//! in-memory repository and the mock media store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use folio_api::routes::build_router;
use folio_api::services::MediaAssetService;
use folio_api::state::AppState;
use folio_core::models::{ParentKind, ParentRef};
use folio_core::{Config, FileValidator};
use folio_db::{MemoryAssetRepository, MemoryParentSource};
use folio_storage::MockMediaStore;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "X-FOLIO-TEST-BOUNDARY";

fn test_config() -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        media_store_base_url: "http://media.test".to_string(),
        media_store_api_key: None,
        media_store_root_folder: "portfolio".to_string(),
        max_assets_per_parent: 20,
        image_max_file_size_bytes: 10 * 1024 * 1024,
        image_allowed_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/gif".to_string(),
            "image/webp".to_string(),
        ],
    }
}

struct TestApp {
    router: Router,
    parents: Arc<MemoryParentSource>,
    store: Arc<MockMediaStore>,
}

fn test_app() -> TestApp {
    let config = test_config();
    let repository = Arc::new(MemoryAssetRepository::new());
    let parents = Arc::new(MemoryParentSource::new());
    let store = Arc::new(MockMediaStore::new());
    let assets = MediaAssetService::new(
        repository,
        parents.clone(),
        store.clone(),
        FileValidator::new(
            config.image_max_file_size_bytes,
            config.image_allowed_content_types.clone(),
        ),
        config.max_assets_per_parent,
        config.media_store_root_folder.clone(),
    );
    let state = Arc::new(AppState::new(config.clone(), assets));
    let router = build_router(&config, state).unwrap();
    TestApp {
        router,
        parents,
        store,
    }
}

fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(2048, 0x11);
    data
}

fn multipart_body(file: &[u8], content_type: &str, extra_fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"upload.png\"\r\nContent-Type: {}\r\n\r\n",
            content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(b"\r\n");
    for (name, value) in extra_fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn upload_project_image_returns_201() {
    let app = test_app();
    let project_id = Uuid::new_v4();
    app.parents
        .insert(ParentRef::new(ParentKind::Project, project_id), "site");

    let body = multipart_body(&png_bytes(), "image/png", &[("is_primary", "true")]);
    let response = app
        .router
        .oneshot(upload_request(
            &format!("/api/v0/projects/{}/images", project_id),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    assert_eq!(json["parent_id"], project_id.to_string());
    assert_eq!(json["is_primary"], true);
    assert_eq!(json["kind"], "gallery");
    assert_eq!(app.store.object_count(), 1);
}

#[tokio::test]
async fn upload_rejects_forged_content_type() {
    let app = test_app();
    let project_id = Uuid::new_v4();
    app.parents
        .insert(ParentRef::new(ParentKind::Project, project_id), "site");

    // Zeroed payload declared as JPEG fails the signature check.
    let body = multipart_body(&[0x00, 0x00, 0x00, 0x00], "image/jpeg", &[]);
    let response = app
        .router
        .oneshot(upload_request(
            &format!("/api/v0/projects/{}/images", project_id),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "INVALID_FILE");
    assert_eq!(json["recoverable"], false);
    assert_eq!(app.store.object_count(), 0);
}

#[tokio::test]
async fn upload_to_unknown_post_returns_404() {
    let app = test_app();
    let body = multipart_body(&png_bytes(), "image/png", &[]);
    let response = app
        .router
        .oneshot(upload_request(
            &format!("/api/v0/posts/{}/images", Uuid::new_v4()),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Blog post not found");
}

#[tokio::test]
async fn cross_parent_access_is_rejected() {
    let app = test_app();
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    app.parents
        .insert(ParentRef::new(ParentKind::Project, owner), "owner");
    app.parents
        .insert(ParentRef::new(ParentKind::Project, other), "other");

    let body = multipart_body(&png_bytes(), "image/png", &[]);
    let response = app
        .router
        .clone()
        .oneshot(upload_request(
            &format!("/api/v0/projects/{}/images", owner),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let image_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v0/projects/{}/images/{}", other, image_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "OWNERSHIP_MISMATCH");
}

#[tokio::test]
async fn set_primary_and_delete_flow() {
    let app = test_app();
    let post_id = Uuid::new_v4();
    app.parents
        .insert(ParentRef::new(ParentKind::BlogPost, post_id), "hello");

    // Two uploads, then promote the second and delete it.
    let response = app
        .router
        .clone()
        .oneshot(upload_request(
            &format!("/api/v0/posts/{}/images", post_id),
            multipart_body(&png_bytes(), "image/png", &[("is_primary", "true")]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router
        .clone()
        .oneshot(upload_request(
            &format!("/api/v0/posts/{}/images", post_id),
            multipart_body(&png_bytes(), "image/png", &[]),
        ))
        .await
        .unwrap();
    let second_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!(
                    "/api/v0/posts/{}/images/{}/primary",
                    post_id, second_id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["is_primary"], true);

    // Exactly one primary in the listing.
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v0/posts/{}/images", post_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listing = json_body(response).await;
    let primaries = listing
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["is_primary"] == true)
        .count();
    assert_eq!(primaries, 1);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v0/posts/{}/images/{}", post_id, second_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.store.delete_calls().len(), 1);
}

#[tokio::test]
async fn update_patches_metadata_without_touching_store() {
    let app = test_app();
    let project_id = Uuid::new_v4();
    app.parents
        .insert(ParentRef::new(ParentKind::Project, project_id), "site");

    let response = app
        .router
        .clone()
        .oneshot(upload_request(
            &format!("/api/v0/projects/{}/images", project_id),
            multipart_body(&png_bytes(), "image/png", &[]),
        ))
        .await
        .unwrap();
    let image_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!(
                    "/api/v0/projects/{}/images/{}",
                    project_id, image_id
                ))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"alt_text":"hero shot","kind":"banner","display_order":2}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["alt_text"], "hero shot");
    assert_eq!(json["kind"], "banner");
    assert_eq!(json["display_order"], 2);
    assert!(app.store.delete_calls().is_empty());
}

#[tokio::test]
async fn update_accepts_put_method() {
    let app = test_app();
    let post_id = Uuid::new_v4();
    app.parents
        .insert(ParentRef::new(ParentKind::BlogPost, post_id), "hello");

    let response = app
        .router
        .clone()
        .oneshot(upload_request(
            &format!("/api/v0/posts/{}/images", post_id),
            multipart_body(&png_bytes(), "image/png", &[]),
        ))
        .await
        .unwrap();
    let image_id = json_body(response).await["id"].as_str().unwrap().to_string();

    // Same merge semantics as PATCH on the same path.
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v0/posts/{}/images/{}", post_id, image_id))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"caption":"cover image"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["caption"], "cover image");
    // Untouched fields survive the merge.
    assert_eq!(json["kind"], "inline");
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_app();
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
