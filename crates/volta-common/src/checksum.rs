//! Checksum utilities for dataset content integrity
//!
//! Dataset content is stored inline in the database; the checksum recorded
//! at upload time lets later reads detect silent corruption.

use crate::error::{Result, VoltaError};
use sha2::{Digest, Sha256};

/// Compute the hex-encoded SHA-256 digest of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Verify that `bytes` hash to `expected`.
///
/// Returns `Ok(())` on a match and a `ChecksumMismatch` error otherwise.
pub fn verify_sha256(bytes: &[u8], expected: &str) -> Result<()> {
    let actual = sha256_hex(bytes);
    if actual == expected {
        Ok(())
    } else {
        Err(VoltaError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        // SHA-256 of the empty string
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_is_deterministic() {
        let content = b"potential,current\n0.1,0.002\n";
        assert_eq!(sha256_hex(content), sha256_hex(content));
    }

    #[test]
    fn test_verify_sha256_match() {
        let content = b"a,b\n1,2\n";
        let digest = sha256_hex(content);
        assert!(verify_sha256(content, &digest).is_ok());
    }

    #[test]
    fn test_verify_sha256_mismatch() {
        let result = verify_sha256(b"a,b\n1,2\n", "deadbeef");
        assert!(matches!(result, Err(VoltaError::ChecksumMismatch { .. })));
    }
}
