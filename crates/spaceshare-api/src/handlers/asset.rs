//! NDA and logo upload handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use bytes::Bytes;

use spaceshare_core::error::AppError;
use spaceshare_core::types::id::AssetId;
use spaceshare_entity::asset::AssetKind;

use crate::dto::response::{ApiResponse, AssetResponse};
use crate::error::ApiError;
use crate::extractors::AuthOwner;
use crate::state::AppState;

/// POST /api/assets/nda
pub async fn upload_nda(
    State(state): State<AppState>,
    owner: AuthOwner,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AssetResponse>>), ApiError> {
    upload(state, owner, AssetKind::Nda, multipart).await
}

/// POST /api/assets/logo
pub async fn upload_logo(
    State(state): State<AppState>,
    owner: AuthOwner,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AssetResponse>>), ApiError> {
    upload(state, owner, AssetKind::Logo, multipart).await
}

/// DELETE /api/assets/{id}
pub async fn release_asset(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<AssetId>,
) -> Result<StatusCode, ApiError> {
    state.provisioner.release(owner.owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload(
    state: AppState,
    owner: AuthOwner,
    kind: AssetKind,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AssetResponse>>), ApiError> {
    let mut content_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            content_type = field.content_type().map(String::from);
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
            );
        }
    }

    let data = data.ok_or_else(|| AppError::validation("file is required"))?;
    let asset = state
        .provisioner
        .upload(owner.owner_id, kind, content_type.as_deref(), data)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AssetResponse::from(asset))),
    ))
}
