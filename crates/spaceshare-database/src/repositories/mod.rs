//! PostgreSQL implementations of the store traits.

pub mod asset;
pub mod audit;
pub mod nda;
pub mod share_link;

pub use asset::AssetRepository;
pub use audit::AuditLogRepository;
pub use nda::NdaAcceptanceRepository;
pub use share_link::ShareLinkRepository;
