//! Artifact checksum computation.
//!
//! The server computes the digest fresh at publish time and is the source
//! of truth for it; client-claimed checksums are never trusted.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of an artifact body (64 characters).
#[must_use]
pub fn digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_known_value() {
        assert_eq!(
            digest(b"123"),
            "a665a45920422f9d417e4867efdc4fb8a04a1f3fff1fa07e998e86f7f7a27ae3"
        );
    }

    #[test]
    fn test_digest_empty_input() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_is_64_hex_chars() {
        let d = digest(b"some artifact bytes");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }
}
