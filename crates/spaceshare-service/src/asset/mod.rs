//! NDA document and logo provisioning.

pub mod provisioner;

pub use provisioner::{AssetContent, AssetProvisioner, UploadError};
