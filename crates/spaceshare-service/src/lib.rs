//! # spaceshare-service
//!
//! Business logic service layer for SpaceShare. Each service orchestrates
//! the persistence stores, the asset storage provider, and the credential
//! primitives to implement one use case:
//!
//! - [`ShareRequestBuilder`] walks an owner through configuring a link
//! - [`AssetProvisioner`] stores NDA documents and logos
//! - [`LinkIssuanceService`] validates and persists a completed request
//! - [`AccessEvaluator`] decides every visitor request
//! - [`NdaService`] records NDA acceptances
//! - [`VisitorAssetService`] serves the NDA document and logo before admission
//! - [`ShareService`] lists and revokes an owner's links
//!
//! Services follow constructor injection; dependencies are provided at
//! construction time via `Arc` references.

pub mod asset;
pub mod audit;
pub mod context;
pub mod share;

#[cfg(test)]
mod testing;

pub use asset::{AssetContent, AssetProvisioner, UploadError};
pub use audit::AuditLogSink;
pub use context::OwnerContext;
pub use share::{
    AccessDecision, AccessEvaluator, AdmissionGrant, CompletedShareLinkRequest, DenialReason,
    LinkIssuanceService, NdaService, ShareField, ShareRequestBuilder, ShareService,
    ValidationError, ViewLimitCounter, VisitorAssetService, VisitorContext, WizardError,
    WizardStep,
};
