//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use spaceshare_api::{AppState, build_app};
use spaceshare_core::config::AppConfig;
use spaceshare_core::types::id::{OwnerId, SpaceId};
use spaceshare_database::Stores;
use spaceshare_storage::MemoryStorageProvider;

/// Minimal PDF accepted as an NDA document.
pub const PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n";

/// PNG signature plus an IHDR header, enough to sniff as an image.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";

const BOUNDARY: &str = "spaceshare-test-boundary";

/// Test application context backed by in-memory stores.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Stores for direct inspection
    pub stores: Stores,
    /// Owner used by default
    pub owner: OwnerId,
    /// Space shared by default
    pub space_id: SpaceId,
}

/// Test response
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON
    pub body: Value,
}

/// Response whose body is not JSON
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Bytes,
}

impl RawResponse {
    /// A header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The machine-readable error code.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"].as_str()
    }
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.share.public_base_url = "https://share.example.test".to_string();

        let stores = Stores::memory();
        let storage = Arc::new(MemoryStorageProvider::new());
        let state = AppState::new(config, stores.clone(), storage);

        Self {
            router: build_app(state),
            stores,
            owner: OwnerId::new(),
            space_id: SpaceId::new(),
        }
    }

    /// Make a JSON request, optionally as an owner
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        owner: Option<OwnerId>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(owner) = owner {
            builder = builder.header("x-owner-id", owner.to_string());
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// Upload an asset as the default owner
    pub async fn upload(&self, kind: &str, content_type: &str, data: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"upload\"\r\n",
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/assets/{kind}"))
            .header("x-owner-id", self.owner.to_string())
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Create a link for the default space as the default owner
    pub async fn create_link(&self, body: Value) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/spaces/{}/links", self.space_id),
            Some(body),
            Some(self.owner),
        )
        .await
    }

    /// Create a link that must succeed and return its visitor token
    pub async fn create_link_token(&self, body: Value) -> String {
        let response = self.create_link(body).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "link creation failed: {}",
            response.body
        );
        token_from_url(response.data()["url"].as_str().unwrap())
    }

    /// Visitor access attempt
    pub async fn access(&self, token: &str, body: Value) -> TestResponse {
        self.request("POST", &format!("/api/s/{token}/access"), Some(body), None)
            .await
    }

    /// GET a path with extra headers, keeping the body as bytes
    pub async fn fetch(&self, path: &str, headers: &[(&str, &str)]) -> RawResponse {
        let mut builder = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        RawResponse {
            status,
            headers,
            bytes,
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// The token is the last path segment of a share URL.
pub fn token_from_url(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().to_string()
}

impl TestApp {
    /// Links the default owner issued for the default space
    pub async fn links(&self) -> Vec<spaceshare_entity::share::ShareLink> {
        self.stores
            .share_links
            .find_by_space(self.space_id, self.owner)
            .await
            .unwrap()
    }
}
