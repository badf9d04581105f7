//! Visitor token minting.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Smallest token entropy accepted, in bytes.
pub const MIN_TOKEN_BYTES: usize = 16;

/// Mints URL-safe random tokens from the operating system RNG.
#[derive(Debug, Clone)]
pub struct LinkTokenGenerator {
    bytes: usize,
}

impl LinkTokenGenerator {
    /// Create a generator producing `bytes` bytes of entropy per token.
    ///
    /// Values below [`MIN_TOKEN_BYTES`] are raised to it.
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(MIN_TOKEN_BYTES),
        }
    }

    /// Mint a fresh token.
    pub fn generate(&self) -> String {
        let mut buf = vec![0u8; self.bytes];
        OsRng.fill_bytes(&mut buf);
        URL_SAFE_NO_PAD.encode(buf)
    }
}

impl Default for LinkTokenGenerator {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_tokens_are_url_safe_and_unique() {
        let generator = LinkTokenGenerator::default();
        let tokens: HashSet<String> = (0..256).map(|_| generator.generate()).collect();
        assert_eq!(tokens.len(), 256);
        for token in &tokens {
            assert_eq!(token.len(), 43);
            assert!(
                token
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            );
        }
    }

    #[test]
    fn test_entropy_floor() {
        let generator = LinkTokenGenerator::new(4);
        assert_eq!(generator.generate().len(), 22);
    }
}
