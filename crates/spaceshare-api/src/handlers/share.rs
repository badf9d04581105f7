//! Owner link management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use validator::Validate;

use spaceshare_core::error::AppError;
use spaceshare_core::types::id::{ShareLinkId, SpaceId};
use spaceshare_entity::asset::{AssetKind, AssetRef};
use spaceshare_service::{ShareField, ShareRequestBuilder};

use crate::dto::request::CreateLinkRequest;
use crate::dto::response::{ApiResponse, LinkDetailResponse, LinkResponse};
use crate::error::ApiError;
use crate::extractors::AuthOwner;
use crate::state::AppState;

/// POST /api/spaces/{space_id}/links
///
/// Drives a share request through every wizard step in one call.
pub async fn create_link(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(space_id): Path<SpaceId>,
    Json(req): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LinkResponse>>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;

    let mut builder = ShareRequestBuilder::new(
        owner.context().clone(),
        space_id,
        state.provisioner.clone(),
        state.issuance.clone(),
    );

    builder.set_field(ShareField::Label(req.label));
    builder.set_field(ShareField::SecurityLevel(req.security_level));
    if let Some(password) = req.password {
        builder.set_field(ShareField::Password(password));
    }
    for email in req.allowed_emails {
        builder.set_field(ShareField::AddEmail(email));
    }
    for domain in req.allowed_domains {
        builder.set_field(ShareField::AddDomain(domain));
    }
    builder.set_field(ShareField::ExpiresAt(req.expires_at));
    builder.set_field(ShareField::ViewLimit(req.view_limit));
    builder.set_field(ShareField::AllowDownloads(req.allow_downloads));
    builder.set_field(ShareField::AllowQa(req.allow_qa));
    builder.set_field(ShareField::EnableWatermark(req.enable_watermark));
    builder.set_field(ShareField::RequireNda(req.require_nda));
    if let Some(id) = req.nda_document_ref {
        builder.attach_uploaded(AssetRef {
            id,
            kind: AssetKind::Nda,
        })?;
    }

    builder.advance()?;

    builder.set_field(ShareField::AccentColor(req.accent_color));
    builder.set_field(ShareField::WelcomeMessage(req.welcome_message));
    if let Some(id) = req.logo_ref {
        builder.attach_uploaded(AssetRef {
            id,
            kind: AssetKind::Logo,
        })?;
    }

    builder.advance()?;
    let issued = builder.submit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(LinkResponse::new(&issued.link, issued.url))),
    ))
}

/// GET /api/spaces/{space_id}/links
pub async fn list_links(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(space_id): Path<SpaceId>,
) -> Result<Json<ApiResponse<Vec<LinkResponse>>>, ApiError> {
    let links = state.shares.list_for_space(&owner, space_id).await?;
    let data = links
        .iter()
        .map(|link| LinkResponse::new(link, state.issuance.share_url(&link.token)))
        .collect();
    Ok(Json(ApiResponse::ok(data)))
}

/// GET /api/links/{id}
pub async fn get_link(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<ShareLinkId>,
) -> Result<Json<ApiResponse<LinkDetailResponse>>, ApiError> {
    let link = state.shares.get(&owner, id).await?;
    let nda_acceptances = state.shares.nda_acceptance_count(&owner, id).await?;
    Ok(Json(ApiResponse::ok(LinkDetailResponse {
        link: LinkResponse::new(&link, state.issuance.share_url(&link.token)),
        nda_acceptances,
    })))
}

/// DELETE /api/links/{id}
pub async fn revoke_link(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<ShareLinkId>,
) -> Result<Json<ApiResponse<LinkResponse>>, ApiError> {
    let link = state.shares.revoke(&owner, id).await?;
    Ok(Json(ApiResponse::ok(LinkResponse::new(
        &link,
        state.issuance.share_url(&link.token),
    ))))
}
