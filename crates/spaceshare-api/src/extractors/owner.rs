//! `AuthOwner` extractor: reads the owner identity set by the upstream gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use spaceshare_core::error::AppError;
use spaceshare_core::types::id::OwnerId;
use spaceshare_service::OwnerContext;

use super::client::client_ip;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated owner's ID.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Extracted owner context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthOwner(pub OwnerContext);

impl AuthOwner {
    /// Returns the inner `OwnerContext`.
    pub fn context(&self) -> &OwnerContext {
        &self.0
    }
}

impl std::ops::Deref for AuthOwner {
    type Target = OwnerContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthOwner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing owner identity"))?;

        let owner_id: OwnerId = raw
            .trim()
            .parse()
            .map_err(|_| AppError::authentication("Invalid owner identity"))?;

        Ok(AuthOwner(OwnerContext::new(owner_id, client_ip(&parts.headers))))
    }
}
