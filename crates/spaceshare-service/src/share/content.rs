//! Pre-admission material served to visitors: the NDA document and the
//! branding logo.

use std::sync::Arc;

use tracing::debug;

use spaceshare_core::error::AppError;
use spaceshare_core::result::AppResult;
use spaceshare_entity::asset::AssetKind;

use super::access::{AccessEvaluator, VisitorContext};
use crate::asset::{AssetContent, AssetProvisioner};

/// Serves the assets a visitor sees on prompt pages.
///
/// Fetches count no view and record no audit event.
#[derive(Debug, Clone)]
pub struct VisitorAssetService {
    access: Arc<AccessEvaluator>,
    provisioner: Arc<AssetProvisioner>,
}

impl VisitorAssetService {
    /// Creates a new visitor asset service.
    pub fn new(access: Arc<AccessEvaluator>, provisioner: Arc<AssetProvisioner>) -> Self {
        Self { access, provisioner }
    }

    /// The NDA document of the link behind `token`.
    ///
    /// The visitor must pass the link's identity gate; the NDA itself need
    /// not be accepted yet.
    pub async fn nda_document(
        &self,
        token: &str,
        visitor: &VisitorContext,
    ) -> AppResult<AssetContent> {
        let link = self.access.check(token, Some(visitor)).await?.map_err(AppError::from)?;
        let Some(nda_document) = link.nda_document_ref.filter(|_| link.require_nda) else {
            return Err(
                AppError::validation("This link does not require an NDA")
                    .with_code("NDA_NOT_REQUIRED"),
            );
        };

        debug!(share_id = %link.id, asset_id = %nda_document, "Serving NDA document");
        self.provisioner
            .open(nda_document, AssetKind::Nda)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "NDA document {nda_document} of share link {} is unavailable",
                    link.id
                ))
            })
    }

    /// The branding logo of the link behind `token`.
    ///
    /// Only existence and expiry are checked so prompt pages can be branded.
    pub async fn logo(&self, token: &str) -> AppResult<AssetContent> {
        let link = self.access.check(token, None).await?.map_err(AppError::from)?;
        let Some(logo) = link.branding.as_ref().and_then(|b| b.logo_ref) else {
            return Err(AppError::not_found("This link has no logo").with_code("NO_LOGO"));
        };

        self.provisioner
            .open(logo, AssetKind::Logo)
            .await?
            .ok_or_else(|| AppError::not_found("This link has no logo").with_code("NO_LOGO"))
    }
}
