//! Public visitor handlers. No owner identity is required.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use spaceshare_service::AssetContent;

use crate::dto::request::{NdaAcceptRequest, VisitorAccessRequest};
use crate::dto::response::{AccessOutcome, ApiResponse, NdaAcceptResponse, VisitorAccessResponse};
use crate::error::ApiError;
use crate::extractors::{client_ip, visitor_from_headers};
use crate::state::AppState;

/// POST /api/s/{token}/access
///
/// The body is optional so open links can be entered without one.
pub async fn access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(token): Path<String>,
    body: Option<Json<VisitorAccessRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<VisitorAccessResponse>>), ApiError> {
    let visitor = body
        .map(|Json(req)| req)
        .unwrap_or_default()
        .into_visitor(client_ip(&headers));

    let decision = state.access.evaluate(&token, &visitor).await?;
    let data = VisitorAccessResponse::from_decision(&token, decision);

    let status = match data.outcome {
        AccessOutcome::Admitted => StatusCode::OK,
        AccessOutcome::PasswordRequired => StatusCode::UNAUTHORIZED,
        AccessOutcome::EmailRequired | AccessOutcome::NdaRequired => StatusCode::FORBIDDEN,
        AccessOutcome::Unavailable => StatusCode::GONE,
        AccessOutcome::NotFound => StatusCode::NOT_FOUND,
    };

    Ok((
        status,
        Json(ApiResponse {
            success: data.outcome == AccessOutcome::Admitted,
            data,
        }),
    ))
}

/// POST /api/s/{token}/nda
pub async fn accept_nda(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(token): Path<String>,
    Json(req): Json<NdaAcceptRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NdaAcceptResponse>>), ApiError> {
    let visitor = req.into_visitor(client_ip(&headers));
    let write = state.nda.accept(&token, &visitor).await?;

    let status = if write.is_new() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ApiResponse::ok(NdaAcceptResponse::new(
            write.acceptance(),
            !write.is_new(),
        ))),
    ))
}

/// GET /api/s/{token}/nda/document
///
/// Credentials come from the `x-share-password`, `x-visitor-email`, and
/// `x-session-id` headers. Does not count a view.
pub async fn nda_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let visitor = visitor_from_headers(&headers);
    let content = state.content.nda_document(&token, &visitor).await?;
    Ok(inline(content))
}

/// GET /api/s/{token}/logo
pub async fn logo(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let content = state.content.logo(&token).await?;
    Ok(inline(content))
}

fn inline(content: AssetContent) -> Response {
    let content_type = HeaderValue::from_str(&content.asset.content_type)
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));
    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
            (header::CONTENT_DISPOSITION, HeaderValue::from_static("inline")),
        ],
        content.data,
    )
        .into_response()
}
