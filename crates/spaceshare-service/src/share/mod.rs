//! Share links: building, issuing, evaluating, and managing them.

pub mod access;
pub mod builder;
pub mod content;
pub mod issuance;
pub mod nda;
pub mod quota;
pub mod request;
pub mod service;
pub mod validation;

pub use access::{AccessDecision, AccessEvaluator, AdmissionGrant, DenialReason, VisitorContext};
pub use builder::{ShareDraft, ShareField, ShareRequestBuilder, StagedAsset, WizardError, WizardStep};
pub use content::VisitorAssetService;
pub use issuance::LinkIssuanceService;
pub use nda::NdaService;
pub use quota::{Admission, ViewLimitCounter};
pub use request::{BrandingRequest, CompletedShareLinkRequest};
pub use service::ShareService;
pub use validation::ValidationError;
