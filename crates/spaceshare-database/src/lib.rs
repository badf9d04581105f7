//! # spaceshare-database
//!
//! Persistence for SpaceShare. Each record type has a backend-agnostic
//! store trait (see [`store`]) with two implementations:
//!
//! - PostgreSQL repositories built on sqlx ([`repositories`])
//! - process-local stores for single-node runs and tests ([`memory`])
//!
//! [`Stores`] bundles one implementation of each trait, selected from
//! configuration.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{
    AcceptanceWrite, AssetRelease, AssetStore, AuditLogStore, NdaAcceptanceStore, ShareLinkStore,
    Stores, ViewCounterSnapshot,
};
