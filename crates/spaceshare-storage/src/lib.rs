//! # spaceshare-storage
//!
//! Byte storage for uploaded assets. The local filesystem provider backs
//! real deployments; the in-memory provider backs tests and throwaway
//! single-node runs.

pub mod providers;

use std::sync::Arc;

use spaceshare_core::config::StorageConfig;
use spaceshare_core::result::AppResult;
use spaceshare_core::traits::StorageProvider;

pub use providers::{LocalStorageProvider, MemoryStorageProvider};

/// Build the storage provider described by configuration.
pub async fn from_config(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    let provider = LocalStorageProvider::new(&config.root_path).await?;
    Ok(Arc::new(provider))
}
