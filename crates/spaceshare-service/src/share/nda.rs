//! NDA acceptance.

use std::sync::Arc;

use tracing::info;

use spaceshare_core::error::AppError;
use spaceshare_core::events::{DomainEvent, ShareEvent};
use spaceshare_core::result::AppResult;
use spaceshare_core::traits::AuditSink;
use spaceshare_database::{AcceptanceWrite, NdaAcceptanceStore};

use super::access::{AccessEvaluator, VisitorContext};
use crate::audit;

/// Records visitors' NDA acceptances.
#[derive(Debug, Clone)]
pub struct NdaService {
    access: Arc<AccessEvaluator>,
    nda_acceptances: Arc<dyn NdaAcceptanceStore>,
    audit: Arc<dyn AuditSink>,
}

impl NdaService {
    /// Creates a new NDA service.
    pub fn new(
        access: Arc<AccessEvaluator>,
        nda_acceptances: Arc<dyn NdaAcceptanceStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            access,
            nda_acceptances,
            audit,
        }
    }

    /// Record that `visitor` accepted the NDA of the link behind `token`.
    ///
    /// The visitor must pass the link's identity gate first, so an NDA
    /// acceptance is only ever recorded for someone who may view the link.
    ///
    /// Idempotent per `(link, identity)`: repeats return the first record
    /// and emit nothing. Different aliases of one person are separate
    /// identities.
    pub async fn accept(&self, token: &str, visitor: &VisitorContext) -> AppResult<AcceptanceWrite> {
        let link = self.access.check(token, Some(visitor)).await?.map_err(AppError::from)?;

        let Some(nda_document) = link.nda_document_ref.filter(|_| link.require_nda) else {
            return Err(
                AppError::validation("This link does not require an NDA")
                    .with_code("NDA_NOT_REQUIRED"),
            );
        };

        let identity = visitor.identity().ok_or_else(|| {
            AppError::validation("A visitor email or session id is required")
                .with_code("IDENTITY_REQUIRED")
        })?;

        let write = self.nda_acceptances.record(link.id, &identity).await?;
        if write.is_new() {
            info!(share_id = %link.id, "NDA accepted");
            audit::record(
                self.audit.as_ref(),
                DomainEvent::share(
                    Some(identity),
                    ShareEvent::NdaAccepted {
                        share_id: link.id,
                        nda_document,
                    },
                )
                .with_ip(visitor.ip_address.clone()),
            )
            .await;
        }
        Ok(write)
    }
}
