//! Audit event emission.

pub mod sink;

pub use sink::{AuditLogSink, record};
