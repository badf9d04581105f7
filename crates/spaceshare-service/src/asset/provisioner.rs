//! Asset provisioner: validates, stores, resolves, and releases uploads.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use spaceshare_core::config::StorageConfig;
use spaceshare_core::error::{AppError, ErrorKind};
use spaceshare_core::events::{AssetEvent, DomainEvent};
use spaceshare_core::result::AppResult;
use spaceshare_core::traits::{AuditSink, StorageProvider};
use spaceshare_core::types::id::{AssetId, OwnerId};
use spaceshare_database::{AssetRelease, AssetStore};
use spaceshare_entity::asset::{Asset, AssetKind, AssetRef, CreateAsset};

use crate::audit;

/// Leading bytes of every PDF file.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Reasons an upload is rejected. All are retryable by the uploader.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Content does not match the declared kind.
    #[error("Expected {expected} content")]
    WrongType {
        /// What the kind requires.
        expected: &'static str,
    },
    /// Zero-byte upload.
    #[error("Upload is empty")]
    Empty,
    /// Upload above the configured size limit.
    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Received size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },
    /// The storage write did not finish in time.
    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),
    /// The storage or record write failed.
    #[error("Upload failed: {0}")]
    Storage(#[source] AppError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let message = err.to_string();
        match err {
            UploadError::WrongType { .. } => {
                AppError::validation(message).with_code("WRONG_ASSET_TYPE")
            }
            UploadError::Empty => AppError::validation(message).with_code("EMPTY_UPLOAD"),
            UploadError::TooLarge { .. } => {
                AppError::validation(message).with_code("UPLOAD_TOO_LARGE")
            }
            UploadError::Timeout(_) => {
                AppError::service_unavailable(message).with_code("UPLOAD_TIMEOUT")
            }
            UploadError::Storage(source) => {
                AppError::with_source(ErrorKind::Storage, message, source).with_code("UPLOAD_FAILED")
            }
        }
    }
}

/// Content type and file extension detected from the upload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DetectedType {
    content_type: &'static str,
    extension: &'static str,
}

fn detect(kind: AssetKind, data: &[u8]) -> Result<DetectedType, UploadError> {
    match kind {
        AssetKind::Nda => {
            if data.starts_with(PDF_MAGIC) {
                Ok(DetectedType {
                    content_type: "application/pdf",
                    extension: "pdf",
                })
            } else {
                Err(UploadError::WrongType { expected: "PDF" })
            }
        }
        AssetKind::Logo => {
            let format =
                image::guess_format(data).map_err(|_| UploadError::WrongType { expected: "image" })?;
            Ok(DetectedType {
                content_type: format.to_mime_type(),
                extension: format.extensions_str().first().copied().unwrap_or("img"),
            })
        }
    }
}

/// A confirmed asset together with its stored bytes.
#[derive(Debug, Clone)]
pub struct AssetContent {
    /// The asset record.
    pub asset: Asset,
    /// The stored bytes.
    pub data: Bytes,
}

/// Stores NDA documents and logos and tracks their lifecycle.
#[derive(Debug, Clone)]
pub struct AssetProvisioner {
    storage: Arc<dyn StorageProvider>,
    assets: Arc<dyn AssetStore>,
    audit: Arc<dyn AuditSink>,
    max_size_bytes: u64,
    upload_timeout: Duration,
}

impl AssetProvisioner {
    /// Creates a new provisioner.
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        assets: Arc<dyn AssetStore>,
        audit: Arc<dyn AuditSink>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            storage,
            assets,
            audit,
            max_size_bytes: config.max_asset_size_bytes,
            upload_timeout: Duration::from_secs(config.upload_timeout_seconds),
        }
    }

    /// Validate and store an upload, returning its confirmed reference.
    ///
    /// The declared content type is informational; the stored type is
    /// detected from the bytes.
    pub async fn upload(
        &self,
        owner: OwnerId,
        kind: AssetKind,
        declared_type: Option<&str>,
        data: Bytes,
    ) -> Result<AssetRef, UploadError> {
        let size = data.len() as u64;
        if size == 0 {
            return Err(UploadError::Empty);
        }
        if size > self.max_size_bytes {
            return Err(UploadError::TooLarge {
                size,
                limit: self.max_size_bytes,
            });
        }

        let detected = detect(kind, &data)?;
        if declared_type.is_some_and(|t| t != detected.content_type) {
            debug!(
                declared = ?declared_type,
                detected = detected.content_type,
                "Declared content type differs from detected type"
            );
        }

        let id = AssetId::new();
        let path = format!("{}/{}.{}", kind.as_str(), id, detected.extension);

        match tokio::time::timeout(self.upload_timeout, self.storage.write(&path, data)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(UploadError::Storage(e)),
            Err(_) => {
                warn!(asset_id = %id, kind = %kind, "Asset upload timed out");
                self.discard_bytes(&path).await;
                return Err(UploadError::Timeout(self.upload_timeout));
            }
        }

        let record = CreateAsset {
            id,
            kind,
            owner_id: owner,
            content_type: detected.content_type.to_string(),
            size_bytes: size as i64,
            storage_path: path.clone(),
        };
        let asset = match self.assets.create(&record).await {
            Ok(asset) => asset,
            Err(e) => {
                self.discard_bytes(&path).await;
                return Err(UploadError::Storage(e));
            }
        };

        info!(
            asset_id = %asset.id,
            owner_id = %owner,
            kind = %kind,
            size_bytes = size,
            "Asset uploaded"
        );

        audit::record(
            self.audit.as_ref(),
            DomainEvent::asset(
                Some(owner.to_string()),
                AssetEvent::Uploaded {
                    asset_id: asset.id,
                    kind: kind.as_str().to_string(),
                    size_bytes: size,
                },
            ),
        )
        .await;

        Ok(asset.reference())
    }

    /// Look up a confirmed asset owned by `owner`.
    ///
    /// Returns `Ok(None)` for unknown, released, or foreign assets. The
    /// kind is not checked; callers compare it against what they expect.
    pub async fn resolve(&self, owner: OwnerId, id: AssetId) -> AppResult<Option<Asset>> {
        Ok(self
            .assets
            .find_by_id(id)
            .await?
            .filter(|a| a.is_confirmed() && a.owner_id == owner))
    }

    /// Read a confirmed asset of the given kind.
    ///
    /// Returns `Ok(None)` when the asset is unknown, released, or of another
    /// kind. No ownership check is made; callers gate access themselves.
    pub async fn open(&self, id: AssetId, kind: AssetKind) -> AppResult<Option<AssetContent>> {
        let Some(asset) = self
            .assets
            .find_by_id(id)
            .await?
            .filter(|a| a.is_confirmed() && a.kind == kind)
        else {
            return Ok(None);
        };
        let data = self.storage.read_bytes(&asset.storage_path).await?;
        Ok(Some(AssetContent { asset, data }))
    }

    /// Release an orphaned upload: the record stops resolving and the bytes
    /// are deleted. Releasing an already-released asset is a no-op.
    ///
    /// The reference check and the state change happen in one store call,
    /// so a link created concurrently either blocks the release or fails.
    pub async fn release(&self, owner: OwnerId, id: AssetId) -> AppResult<()> {
        let Some(asset) = self.assets.find_by_id(id).await? else {
            return Err(AppError::not_found(format!("Asset {id} not found")));
        };
        if asset.owner_id != owner {
            return Err(AppError::not_found(format!("Asset {id} not found")));
        }

        let released = match self.assets.release_unreferenced(id, Utc::now()).await? {
            AssetRelease::Released(asset) => asset,
            AssetRelease::Unchanged => return Ok(()),
            AssetRelease::InUse => {
                return Err(AppError::conflict(format!(
                    "Asset {id} is referenced by a share link"
                ))
                .with_code("ASSET_IN_USE"));
            }
        };
        self.discard_bytes(&released.storage_path).await;

        info!(asset_id = %id, kind = %released.kind, "Asset released");
        audit::record(
            self.audit.as_ref(),
            DomainEvent::asset(Some(owner.to_string()), AssetEvent::Released { asset_id: id }),
        )
        .await;
        Ok(())
    }

    async fn discard_bytes(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path, error = %e, "Failed to delete asset bytes");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;

    use spaceshare_database::Stores;
    use spaceshare_storage::MemoryStorageProvider;

    use super::*;
    use crate::audit::AuditLogSink;

    pub(crate) const PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n";
    pub(crate) const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";

    pub(crate) fn provisioner_with(
        stores: &Stores,
        storage: Arc<dyn StorageProvider>,
    ) -> AssetProvisioner {
        AssetProvisioner::new(
            storage,
            stores.assets.clone(),
            Arc::new(AuditLogSink::new(stores.audit_log.clone())),
            &StorageConfig {
                max_asset_size_bytes: 1024,
                upload_timeout_seconds: 5,
                ..StorageConfig::default()
            },
        )
    }

    /// Storage that never finishes writing.
    #[derive(Debug)]
    struct StalledStorage;

    #[async_trait]
    impl StorageProvider for StalledStorage {
        fn provider_type(&self) -> &str {
            "stalled"
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
        async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
            Err(AppError::not_found(path.to_string()))
        }
        async fn write(&self, _path: &str, _data: Bytes) -> AppResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
        async fn delete(&self, _path: &str) -> AppResult<()> {
            Ok(())
        }
        async fn exists(&self, _path: &str) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_nda_must_be_pdf() {
        let stores = Stores::memory();
        let storage = MemoryStorageProvider::new();
        let provisioner = provisioner_with(&stores, Arc::new(storage.clone()));
        let owner = OwnerId::new();

        let err = provisioner
            .upload(owner, AssetKind::Nda, Some("application/pdf"), Bytes::from_static(PNG))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::WrongType { expected: "PDF" }));
        assert!(storage.is_empty());

        let asset = provisioner
            .upload(owner, AssetKind::Nda, None, Bytes::from_static(PDF))
            .await
            .unwrap();
        assert_eq!(asset.kind, AssetKind::Nda);
        let stored = provisioner.resolve(owner, asset.id).await.unwrap().unwrap();
        assert_eq!(stored.content_type, "application/pdf");
        assert!(stored.storage_path.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_logo_must_be_image() {
        let stores = Stores::memory();
        let provisioner = provisioner_with(&stores, Arc::new(MemoryStorageProvider::new()));
        let owner = OwnerId::new();

        let err = provisioner
            .upload(owner, AssetKind::Logo, None, Bytes::from_static(PDF))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::WrongType { expected: "image" }));

        let logo = provisioner
            .upload(owner, AssetKind::Logo, Some("image/png"), Bytes::from_static(PNG))
            .await
            .unwrap();
        let stored = provisioner.resolve(owner, logo.id).await.unwrap().unwrap();
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_size_limits() {
        let stores = Stores::memory();
        let provisioner = provisioner_with(&stores, Arc::new(MemoryStorageProvider::new()));
        let owner = OwnerId::new();

        let err = provisioner
            .upload(owner, AssetKind::Nda, None, Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Empty));

        let mut big = PDF.to_vec();
        big.resize(2048, b' ');
        let err = provisioner
            .upload(owner, AssetKind::Nda, None, Bytes::from(big))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { size: 2048, limit: 1024 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_write_times_out() {
        let stores = Stores::memory();
        let provisioner = provisioner_with(&stores, Arc::new(StalledStorage));

        let err = provisioner
            .upload(OwnerId::new(), AssetKind::Nda, None, Bytes::from_static(PDF))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Timeout(_)));

        let app: AppError = err.into();
        assert_eq!(app.kind, ErrorKind::ServiceUnavailable);
        assert_eq!(app.code, Some("UPLOAD_TIMEOUT"));
    }

    #[tokio::test]
    async fn test_release_is_idempotent_and_final() {
        let stores = Stores::memory();
        let storage = MemoryStorageProvider::new();
        let provisioner = provisioner_with(&stores, Arc::new(storage.clone()));
        let owner = OwnerId::new();

        let asset = provisioner
            .upload(owner, AssetKind::Nda, None, Bytes::from_static(PDF))
            .await
            .unwrap();
        assert_eq!(storage.len(), 1);

        provisioner.release(owner, asset.id).await.unwrap();
        provisioner.release(owner, asset.id).await.unwrap();

        assert!(storage.is_empty());
        assert!(provisioner.resolve(owner, asset.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_foreign_assets_do_not_resolve() {
        let stores = Stores::memory();
        let provisioner = provisioner_with(&stores, Arc::new(MemoryStorageProvider::new()));
        let owner = OwnerId::new();
        let stranger = OwnerId::new();

        let asset = provisioner
            .upload(owner, AssetKind::Logo, None, Bytes::from_static(PNG))
            .await
            .unwrap();

        assert!(provisioner.resolve(stranger, asset.id).await.unwrap().is_none());
        let err = provisioner.release(stranger, asset.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_open_reads_confirmed_asset_of_kind() {
        let stores = Stores::memory();
        let provisioner = provisioner_with(&stores, Arc::new(MemoryStorageProvider::new()));
        let owner = OwnerId::new();

        let nda = provisioner
            .upload(owner, AssetKind::Nda, None, Bytes::from_static(PDF))
            .await
            .unwrap();
        let content = provisioner.open(nda.id, AssetKind::Nda).await.unwrap().unwrap();
        assert_eq!(content.data.as_ref(), PDF);
        assert_eq!(content.asset.content_type, "application/pdf");

        assert!(provisioner.open(nda.id, AssetKind::Logo).await.unwrap().is_none());
        assert!(provisioner.open(AssetId::new(), AssetKind::Nda).await.unwrap().is_none());

        provisioner.release(owner, nda.id).await.unwrap();
        assert!(provisioner.open(nda.id, AssetKind::Nda).await.unwrap().is_none());
    }
}
