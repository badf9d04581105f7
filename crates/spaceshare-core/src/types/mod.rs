//! Core type definitions used across the SpaceShare workspace.

pub mod id;

pub use id::*;
