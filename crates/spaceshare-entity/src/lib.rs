//! # spaceshare-entity
//!
//! Domain entity models for SpaceShare. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`; row types
//! additionally derive `sqlx::FromRow`.

pub mod asset;
pub mod audit;
pub mod share;
