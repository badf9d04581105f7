//! Core traits defined in `spaceshare-core` and implemented by other crates.

pub mod audit;
pub mod storage;

pub use audit::AuditSink;
pub use storage::StorageProvider;
