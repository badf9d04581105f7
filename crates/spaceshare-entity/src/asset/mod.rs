//! Uploaded asset entities (NDA documents and logos).

pub mod model;

pub use model::{Asset, AssetKind, AssetRef, AssetState, CreateAsset};
