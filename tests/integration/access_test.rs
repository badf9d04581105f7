//! Integration tests for the visitor access pipeline.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let app = helpers::TestApp::new();

    let response = app.access("no-such-token", json!({})).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.data()["outcome"], "not_found");
}

#[tokio::test]
async fn test_open_link_without_body() {
    let app = helpers::TestApp::new();
    let token = app
        .create_link_token(json!({ "allow_downloads": true, "enable_watermark": true }))
        .await;

    let response = app
        .request("POST", &format!("/api/s/{token}/access"), None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["outcome"], "admitted");
    assert_eq!(data["permissions"]["allow_downloads"], true);
    assert_eq!(data["permissions"]["allow_qa"], false);
    assert_eq!(data["content_url"], format!("/api/s/{token}/content"));
}

#[tokio::test]
async fn test_view_limit_is_enforced() {
    let app = helpers::TestApp::new();
    let token = app.create_link_token(json!({ "view_limit": 2 })).await;

    let first = app.access(&token, json!({})).await;
    assert_eq!(first.data()["remaining_views"], 1);
    let second = app.access(&token, json!({})).await;
    assert_eq!(second.data()["remaining_views"], 0);

    let third = app.access(&token, json!({})).await;
    assert_eq!(third.status, StatusCode::GONE);
    assert_eq!(third.data()["outcome"], "unavailable");
    assert_eq!(third.data()["reason"], "limit_reached");

    assert_eq!(app.links().await[0].view_count, 2);
}

#[tokio::test]
async fn test_password_link() {
    let app = helpers::TestApp::new();
    let token = app
        .create_link_token(json!({
            "security_level": "password",
            "password": "correct horse",
            "view_limit": 5,
        }))
        .await;

    let missing = app.access(&token, json!({})).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.data()["outcome"], "password_required");

    let wrong = app.access(&token, json!({ "password": "battery staple" })).await;
    assert_eq!(wrong.data()["outcome"], "password_required");

    // Denials never consume views.
    assert_eq!(app.links().await[0].view_count, 0);

    let right = app.access(&token, json!({ "password": "correct horse" })).await;
    assert_eq!(right.status, StatusCode::OK);
    assert_eq!(right.data()["remaining_views"], 4);
}

#[tokio::test]
async fn test_whitelist_link() {
    let app = helpers::TestApp::new();
    let token = app
        .create_link_token(json!({
            "security_level": "whitelist",
            "password": "s3cret",
            "allowed_emails": ["carol@partner.io"],
            "allowed_domains": ["acme.com"],
        }))
        .await;

    let by_domain = app
        .access(&token, json!({ "email": "Bob@Acme.com", "password": "s3cret" }))
        .await;
    assert_eq!(by_domain.data()["outcome"], "admitted");

    let by_email = app
        .access(&token, json!({ "email": "carol@partner.io", "password": "s3cret" }))
        .await;
    assert_eq!(by_email.data()["outcome"], "admitted");

    let outsider = app
        .access(&token, json!({ "email": "mallory@evil.io", "password": "s3cret" }))
        .await;
    assert_eq!(outsider.status, StatusCode::FORBIDDEN);
    assert_eq!(outsider.data()["outcome"], "email_required");

    let wrong_password = app
        .access(&token, json!({ "email": "bob@acme.com", "password": "nope" }))
        .await;
    assert_eq!(wrong_password.data()["outcome"], "email_required");
}

#[tokio::test]
async fn test_expired_link() {
    let app = helpers::TestApp::new();
    let expired = (Utc::now() - Duration::minutes(5)).to_rfc3339();
    let token = app
        .create_link_token(json!({ "expires_at": expired }))
        .await;

    let response = app.access(&token, json!({})).await;

    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(response.data()["reason"], "expired");
}

#[tokio::test]
async fn test_nda_flow() {
    let app = helpers::TestApp::new();
    let nda = app.upload("nda", "application/pdf", helpers::PDF).await;
    let nda_id = nda.data()["id"].clone();
    let token = app
        .create_link_token(json!({
            "require_nda": true,
            "nda_document_ref": nda_id,
            "view_limit": 3,
        }))
        .await;

    let pending = app.access(&token, json!({ "email": "dana@fund.vc" })).await;
    assert_eq!(pending.status, StatusCode::FORBIDDEN);
    assert_eq!(pending.data()["outcome"], "nda_required");
    assert_eq!(pending.data()["nda_document"], nda_id);

    let nda_path = format!("/api/s/{token}/nda");
    let accepted = app
        .request("POST", &nda_path, Some(json!({ "email": "Dana@Fund.vc" })), None)
        .await;
    assert_eq!(accepted.status, StatusCode::CREATED);
    assert_eq!(accepted.data()["already_accepted"], false);

    let again = app
        .request("POST", &nda_path, Some(json!({ "email": "dana@fund.vc" })), None)
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.data()["already_accepted"], true);
    assert_eq!(again.data()["accepted_at"], accepted.data()["accepted_at"]);

    let admitted = app.access(&token, json!({ "email": "dana@fund.vc" })).await;
    assert_eq!(admitted.data()["outcome"], "admitted");

    // Another identity still has to accept.
    let other = app.access(&token, json!({ "session_id": "anon-42" })).await;
    assert_eq!(other.data()["outcome"], "nda_required");

    let link = &app.links().await[0];
    assert_eq!(link.view_count, 1);
    let detail = app
        .request(
            "GET",
            &format!("/api/links/{}", link.id),
            None,
            Some(app.owner),
        )
        .await;
    assert_eq!(detail.data()["nda_acceptances"], 1);
}

#[tokio::test]
async fn test_nda_accept_requires_identity_and_nda_link() {
    let app = helpers::TestApp::new();
    let open = app.create_link_token(json!({})).await;

    let not_required = app
        .request(
            "POST",
            &format!("/api/s/{open}/nda"),
            Some(json!({ "email": "a@b.io" })),
            None,
        )
        .await;
    assert_eq!(not_required.status, StatusCode::BAD_REQUEST);
    assert_eq!(not_required.error_code(), Some("NDA_NOT_REQUIRED"));

    let nda = app.upload("nda", "application/pdf", helpers::PDF).await;
    let token = app
        .create_link_token(json!({ "require_nda": true, "nda_document_ref": nda.data()["id"] }))
        .await;
    let anonymous = app
        .request("POST", &format!("/api/s/{token}/nda"), Some(json!({})), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::BAD_REQUEST);
    assert_eq!(anonymous.error_code(), Some("IDENTITY_REQUIRED"));
}

#[tokio::test]
async fn test_nda_document_readable_while_pending() {
    let app = helpers::TestApp::new();
    let nda = app.upload("nda", "application/pdf", helpers::PDF).await;
    let token = app
        .create_link_token(json!({
            "security_level": "password",
            "password": "s3cret",
            "require_nda": true,
            "nda_document_ref": nda.data()["id"],
            "view_limit": 1,
        }))
        .await;

    let pending = app
        .access(&token, json!({ "password": "s3cret", "email": "erin@fund.vc" }))
        .await;
    assert_eq!(pending.data()["outcome"], "nda_required");

    let path = format!("/api/s/{token}/nda/document");
    let document = app
        .fetch(
            &path,
            &[("x-share-password", "s3cret"), ("x-visitor-email", "erin@fund.vc")],
        )
        .await;
    assert_eq!(document.status, StatusCode::OK);
    assert_eq!(document.header("content-type"), Some("application/pdf"));
    assert_eq!(document.header("cache-control"), Some("no-store"));
    assert_eq!(document.bytes.as_ref(), helpers::PDF);

    let no_password = app.fetch(&path, &[("x-visitor-email", "erin@fund.vc")]).await;
    assert_eq!(no_password.status, StatusCode::UNAUTHORIZED);

    // Accepting needs the password too.
    let nda_path = format!("/api/s/{token}/nda");
    let refused = app
        .request("POST", &nda_path, Some(json!({ "email": "erin@fund.vc" })), None)
        .await;
    assert_eq!(refused.status, StatusCode::UNAUTHORIZED);
    assert_eq!(refused.error_code(), Some("PASSWORD_REQUIRED"));
    let accepted = app
        .request(
            "POST",
            &nda_path,
            Some(json!({ "email": "erin@fund.vc", "password": "s3cret" })),
            None,
        )
        .await;
    assert_eq!(accepted.status, StatusCode::CREATED);

    let admitted = app
        .access(&token, json!({ "password": "s3cret", "email": "erin@fund.vc" }))
        .await;
    assert_eq!(admitted.data()["outcome"], "admitted");
    // Reading the document never used the single view.
    assert_eq!(app.links().await[0].view_count, 1);

    let missing = app.fetch("/api/s/no-such-token/nda/document", &[]).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logo_is_served_before_admission() {
    let app = helpers::TestApp::new();
    let logo = app.upload("logo", "image/png", helpers::PNG).await;
    let token = app
        .create_link_token(json!({
            "security_level": "password",
            "password": "s3cret",
            "logo_ref": logo.data()["id"],
        }))
        .await;

    let response = app.fetch(&format!("/api/s/{token}/logo"), &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("image/png"));
    assert_eq!(response.bytes.as_ref(), helpers::PNG);

    let plain = app.create_link_token(json!({})).await;
    let none = app.fetch(&format!("/api/s/{plain}/logo"), &[]).await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);

    let expired = (Utc::now() - Duration::minutes(1)).to_rfc3339();
    let stale = app
        .create_link_token(json!({ "logo_ref": logo.data()["id"], "expires_at": expired }))
        .await;
    let gone = app.fetch(&format!("/api/s/{stale}/logo"), &[]).await;
    assert_eq!(gone.status, StatusCode::GONE);
}

#[tokio::test]
async fn test_concurrent_visitors_respect_limit() {
    let app = helpers::TestApp::new();
    let token = app.create_link_token(json!({ "view_limit": 3 })).await;

    let responses =
        futures::future::join_all((0..12).map(|_| app.access(&token, json!({})))).await;

    let admitted = responses
        .iter()
        .filter(|r| r.data()["outcome"] == "admitted")
        .count();
    assert_eq!(admitted, 3);
    assert!(
        responses
            .iter()
            .filter(|r| r.data()["outcome"] != "admitted")
            .all(|r| r.data()["reason"] == "limit_reached")
    );
    assert_eq!(app.links().await[0].view_count, 3);
}
