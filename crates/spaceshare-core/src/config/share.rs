//! Share link issuance configuration.

use serde::{Deserialize, Serialize};

/// Settings for minting visitor-facing link URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Public origin used to build canonical share URLs (no trailing slash).
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Random bytes per token. Values below 16 are raised to 16.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
            token_bytes: default_token_bytes(),
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_token_bytes() -> usize {
    32
}
