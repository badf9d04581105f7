//! Integration tests for link creation, assets, listing and revocation.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use spaceshare_core::types::id::OwnerId;

#[tokio::test]
async fn test_create_open_link() {
    let app = helpers::TestApp::new();

    let response = app
        .create_link(json!({ "label": "Board pack", "allow_downloads": true }))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let data = response.data();
    let url = data["url"].as_str().unwrap();
    assert!(url.starts_with("https://share.example.test/s/"));
    assert_eq!(helpers::token_from_url(url).len(), 43);
    assert_eq!(data["status"], "active");
    assert_eq!(data["policy"]["security_level"], "open");
    assert_eq!(data["policy"]["view_count"], 0);
    assert!(data.get("token").is_none());
}

#[tokio::test]
async fn test_owner_header_required() {
    let app = helpers::TestApp::new();

    let path = format!("/api/spaces/{}/links", app.space_id);
    let missing = app.request("POST", &path, Some(json!({})), None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let request = axum::http::Request::builder()
        .method("GET")
        .uri(&path)
        .header("x-owner-id", "not-a-uuid")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_level_requires_password() {
    let app = helpers::TestApp::new();

    let response = app.create_link(json!({ "security_level": "password" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("MISSING_PASSWORD"));
    assert!(app.links().await.is_empty());
}

#[tokio::test]
async fn test_whitelist_requires_an_entry() {
    let app = helpers::TestApp::new();

    let response = app
        .create_link(json!({ "security_level": "whitelist", "password": "s3cret" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("EMPTY_WHITELIST"));
}

#[tokio::test]
async fn test_nda_required_without_document() {
    let app = helpers::TestApp::new();

    let response = app.create_link(json!({ "require_nda": true })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("MISSING_NDA"));
    assert!(app.links().await.is_empty());
}

#[tokio::test]
async fn test_zero_view_limit_rejected() {
    let app = helpers::TestApp::new();

    let response = app.create_link(json!({ "view_limit": 0 })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logo_must_be_an_image() {
    let app = helpers::TestApp::new();

    let response = app.upload("logo", "image/png", helpers::PDF).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("WRONG_ASSET_TYPE"));
}

#[tokio::test]
async fn test_nda_link_with_branding() {
    let app = helpers::TestApp::new();

    let nda = app.upload("nda", "application/pdf", helpers::PDF).await;
    assert_eq!(nda.status, StatusCode::CREATED);
    assert_eq!(nda.data()["kind"], "nda");
    let nda_id = nda.data()["id"].clone();

    let logo = app.upload("logo", "image/png", helpers::PNG).await;
    assert_eq!(logo.status, StatusCode::CREATED);
    let logo_id = logo.data()["id"].clone();

    let response = app
        .create_link(json!({
            "security_level": "password",
            "password": "s3cret",
            "require_nda": true,
            "nda_document_ref": nda_id,
            "logo_ref": logo_id,
            "accent_color": "#0A84FF",
            "welcome_message": "Welcome to the data room",
        }))
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let data = response.data();
    assert_eq!(data["nda_document_ref"], nda_id);
    assert_eq!(data["branding"]["logo_ref"], logo_id);
    assert_eq!(data["branding"]["accent_color"], "#0a84ff");
    assert_eq!(data["policy"]["password_protected"], true);

    // Referenced assets cannot be released.
    let release = app
        .request(
            "DELETE",
            &format!("/api/assets/{}", nda_id.as_str().unwrap()),
            None,
            Some(app.owner),
        )
        .await;
    assert_eq!(release.status, StatusCode::CONFLICT);
    assert_eq!(release.error_code(), Some("ASSET_IN_USE"));
}

#[tokio::test]
async fn test_release_orphaned_asset() {
    let app = helpers::TestApp::new();

    let nda = app.upload("nda", "application/pdf", helpers::PDF).await;
    let path = format!("/api/assets/{}", nda.data()["id"].as_str().unwrap());

    let stranger = app.request("DELETE", &path, None, Some(OwnerId::new())).await;
    assert_eq!(stranger.status, StatusCode::NOT_FOUND);

    let release = app.request("DELETE", &path, None, Some(app.owner)).await;
    assert_eq!(release.status, StatusCode::NO_CONTENT);

    // A released asset no longer resolves for new links.
    let response = app
        .create_link(json!({
            "require_nda": true,
            "nda_document_ref": nda.data()["id"],
        }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("MISSING_NDA"));
}

#[tokio::test]
async fn test_list_get_and_scope_by_owner() {
    let app = helpers::TestApp::new();
    app.create_link_token(json!({ "label": "first" })).await;
    app.create_link_token(json!({ "label": "second" })).await;

    let list_path = format!("/api/spaces/{}/links", app.space_id);
    let list = app.request("GET", &list_path, None, Some(app.owner)).await;
    assert_eq!(list.status, StatusCode::OK);
    let items = list.data().as_array().unwrap();
    assert_eq!(items.len(), 2);

    let id = items[0]["id"].as_str().unwrap().to_string();
    let get = app
        .request("GET", &format!("/api/links/{id}"), None, Some(app.owner))
        .await;
    assert_eq!(get.status, StatusCode::OK);
    assert_eq!(get.data()["nda_acceptances"], 0);

    let stranger = OwnerId::new();
    let hidden = app
        .request("GET", &format!("/api/links/{id}"), None, Some(stranger))
        .await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let other_list = app.request("GET", &list_path, None, Some(stranger)).await;
    assert_eq!(other_list.data().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_revoke_is_idempotent_and_final() {
    let app = helpers::TestApp::new();
    let token = app.create_link_token(json!({})).await;
    let id = app.links().await[0].id;

    let path = format!("/api/links/{id}");
    let first = app.request("DELETE", &path, None, Some(app.owner)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["status"], "revoked");
    let revoked_at = first.data()["revoked_at"].clone();

    let second = app.request("DELETE", &path, None, Some(app.owner)).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["revoked_at"], revoked_at);

    let access = app.access(&token, json!({})).await;
    assert_eq!(access.status, StatusCode::NOT_FOUND);
    assert_eq!(access.data()["outcome"], "not_found");
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
}
