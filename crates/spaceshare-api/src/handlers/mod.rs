//! HTTP request handlers organized by domain.

pub mod asset;
pub mod health;
pub mod share;
pub mod visitor;
