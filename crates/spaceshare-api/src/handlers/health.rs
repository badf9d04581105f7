//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// Reports `degraded` with 503 when either backend is unreachable.
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = state
        .stores
        .share_links
        .health_check()
        .await
        .unwrap_or(false);
    let storage = state.storage.health_check().await.unwrap_or(false);

    let healthy = database && storage;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse {
            success: healthy,
            data: HealthResponse {
                status: if healthy { "ok" } else { "degraded" }.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                database: availability(database),
                storage: availability(storage),
            },
        }),
    )
}

fn availability(up: bool) -> String {
    if up { "available" } else { "unavailable" }.to_string()
}
