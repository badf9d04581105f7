//! Route definitions for the SpaceShare HTTP API.
//!
//! All routes are mounted under `/api`. Owner routes require the
//! `x-owner-id` header; visitor routes under `/api/s/{token}` do not.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Multipart framing allowance on top of the asset size limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .storage
        .max_asset_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let api_routes = Router::new()
        .merge(link_routes())
        .merge(asset_routes())
        .merge(visitor_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Owner link management
fn link_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/spaces/{space_id}/links",
            post(handlers::share::create_link).get(handlers::share::list_links),
        )
        .route(
            "/links/{id}",
            get(handlers::share::get_link).delete(handlers::share::revoke_link),
        )
}

/// NDA and logo uploads
fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/assets/nda", post(handlers::asset::upload_nda))
        .route("/assets/logo", post(handlers::asset::upload_logo))
        .route("/assets/{id}", delete(handlers::asset::release_asset))
}

/// Public visitor endpoints
fn visitor_routes() -> Router<AppState> {
    Router::new()
        .route("/s/{token}/access", post(handlers::visitor::access))
        .route("/s/{token}/nda", post(handlers::visitor::accept_nda))
        .route("/s/{token}/nda/document", get(handlers::visitor::nda_document))
        .route("/s/{token}/logo", get(handlers::visitor::logo))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
