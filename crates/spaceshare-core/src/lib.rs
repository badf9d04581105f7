//! # spaceshare-core
//!
//! Core crate for SpaceShare. Contains the unified error system, the
//! configuration schema, typed identifiers, domain events, and the traits
//! implemented by the storage and audit backends.
//!
//! This crate has **no** internal dependencies on other SpaceShare crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
