use super::*;
use crate::catalog::CatalogConfig;
use crate::runtime::RealRuntime;
use axum::body::Body;
use axum::http::{Request, header};
use http_body_util::BodyExt;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

const ROOT_URL: &str = "http://api.example.com/packages";

fn write_release(root: &Path, rel_dir: &str, version: &str) {
    let dir = root.join(rel_dir);
    fs::create_dir_all(&dir).unwrap();
    let body = json!({
        "version": version,
        "date": "2024-01-01",
        "package": { "zip": format!("{}/foo.zip", rel_dir) }
    });
    fs::write(dir.join("release.json"), body.to_string()).unwrap();
}

fn fixture() -> (TempDir, Router) {
    let root = tempdir().unwrap();
    write_release(root.path(), "plugins/foo/1.0", "1.0");
    write_release(root.path(), "plugins/foo/2.0", "2.0");
    let catalog = Catalog::new(RealRuntime, CatalogConfig::new(root.path(), ROOT_URL));
    (root, router(Arc::new(catalog)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get(app: Router, query: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .uri(format!("/?{}", query))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn post(app: Router, form: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(app, request).await
}

async fn post_to(
    app: Router,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

#[tokio::test]
async fn test_show_all_versions() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "action=show&slug=plugins/foo").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["slug"], "plugins/foo");
    assert_eq!(
        value["versions"]["2.0"]["package"],
        "http://api.example.com/packages/plugins/foo/2.0/foo.zip"
    );
}

#[tokio::test]
async fn test_show_single_version_over_post() {
    let (_root, app) = fixture();
    let (status, body) = post(app, "action=show&slug=plugins%2Ffoo&version=1.0").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        value,
        json!({
            "version": "1.0",
            "last_updated": "2024-01-01",
            "download_link": "http://api.example.com/packages/plugins/foo/1.0/foo.zip",
            "slug": "plugins/foo"
        })
    );
}

#[tokio::test]
async fn test_check_with_update() {
    let (_root, app) = fixture();
    let (status, body) = post(app, "action=CHECK&slug=plugins/foo&version=1.0&api_key=abc").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["version"], "1.0");
    assert_eq!(value["new_version"], "2.0");
}

#[tokio::test]
async fn test_latest() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "action=latest&slug=plugins/foo").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["version"], "2.0");
    assert_eq!(value["slug"], "plugins/foo");
}

#[tokio::test]
async fn test_index() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "action=index").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        value,
        json!(["plugins/foo/1.0/release.json", "plugins/foo/2.0/release.json"])
    );
}

#[tokio::test]
async fn test_post_with_query_string_only() {
    let (_root, app) = fixture();
    let (status, body) = post_to(app, "/?action=latest&slug=plugins/foo", None, "").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["version"], "2.0");
}

#[tokio::test]
async fn test_post_body_overrides_query_string() {
    let (_root, app) = fixture();
    let (status, body) = post_to(
        app,
        "/?action=show&slug=plugins/foo&version=2.0",
        Some("application/x-www-form-urlencoded"),
        "version=1.0",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["version"], "1.0");
    assert_eq!(value["slug"], "plugins/foo");
}

#[tokio::test]
async fn test_post_json_body() {
    let (_root, app) = fixture();
    let (status, body) = post_to(
        app,
        "/",
        Some("application/json"),
        r#"{"action":"check","slug":"plugins/foo","version":"1.0"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["new_version"], "2.0");
}

#[tokio::test]
async fn test_repeated_parameter_keeps_last_value() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "action=latest&slug=plugins/nope&slug=plugins/foo").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["slug"], "plugins/foo");
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let (_root, app) = fixture();
    let (status, body) = post_to(app, "/", Some("application/json"), "{").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("Malformed request body"));
}

#[tokio::test]
async fn test_missing_action_is_bad_request() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "slug=plugins/foo").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "No action provided");
}

#[tokio::test]
async fn test_unknown_action_is_bad_request() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "action=upload").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid action: upload");
}

#[tokio::test]
async fn test_missing_slug_is_bad_request() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "action=latest").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "No slug provided");
}

#[tokio::test]
async fn test_check_without_version_is_bad_request() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "action=check&slug=plugins/foo").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "No current version provided");
}

#[tokio::test]
async fn test_unknown_package_is_not_found() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "action=show&slug=plugins/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Package not found: plugins/nope");
}

#[tokio::test]
async fn test_unknown_version_is_not_found() {
    let (_root, app) = fixture();
    let (status, body) = get(app, "action=show&slug=plugins/foo&version=9.9").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Package version not found: 9.9");
}

#[test]
fn test_error_status_mapping() {
    let status = |e: CatalogError| e.into_response().status();

    assert_eq!(
        status(CatalogError::invalid_argument("x")),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(status(CatalogError::not_found("x")), StatusCode::NOT_FOUND);
    assert_eq!(
        status(CatalogError::Unexpected(anyhow!("disk on fire"))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
