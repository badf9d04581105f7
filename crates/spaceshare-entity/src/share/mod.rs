//! Share link domain entities.

pub mod link;
pub mod model;
pub mod nda;
pub mod whitelist;

pub use link::{IssuedShareLink, PolicySummary};
pub use model::{
    Branding, CreateShareLink, EffectivePermissions, LinkStatus, SecurityLevel, ShareLink,
};
pub use nda::NdaAcceptance;
