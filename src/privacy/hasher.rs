//! One-way identity hashing
//!
//! The anonymizer only needs "bytes in, fixed-length hex digest out", so
//! the primitive sits behind the narrow [`OneWayHash`] capability. The
//! validator reads the digest length from the same capability, keeping
//! the "is this identifier hashed?" check in step with the primitive.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// One-way hash capability
pub trait OneWayHash: Send + Sync {
    /// Hex digest of `input`
    fn digest_hex(&self, input: &[u8]) -> String;

    /// Length of every digest returned by `digest_hex`, in hex characters
    fn digest_hex_len(&self) -> usize;

    /// Human-readable algorithm name (used in logs)
    fn name(&self) -> &str;
}

/// SHA-256, rendered as 64 lowercase hex characters
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hash;

impl OneWayHash for Sha256Hash {
    fn digest_hex(&self, input: &[u8]) -> String {
        hex_encode(&Sha256::digest(input))
    }

    fn digest_hex_len(&self) -> usize {
        64
    }

    fn name(&self) -> &str {
        "sha256"
    }
}

/// Process-wide hash salt.
///
/// Zeroized on drop; `Debug` never prints the value.
#[derive(Clone)]
pub struct Salt(Zeroizing<String>);

impl Salt {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Raw salt value (for hashing only)
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt([REDACTED; {} bytes])", self.0.len())
    }
}

/// `hash(subject_id ‖ salt)`
pub fn salted_digest(hasher: &dyn OneWayHash, subject_id: &str, salt: &Salt) -> String {
    let mut input = Zeroizing::new(Vec::with_capacity(subject_id.len() + salt.0.len()));
    input.extend_from_slice(subject_id.as_bytes());
    input.extend_from_slice(salt.expose().as_bytes());
    hasher.digest_hex(&input)
}

/// Whether `value` looks like a digest produced by `hasher`
pub fn is_hex_digest(value: &str, expected_len: usize) -> bool {
    value.len() == expected_len && value.bytes().all(|b| b.is_ascii_hexdigit())
}

fn hex_encode(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            Sha256Hash.digest_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_length_matches_capability() {
        let digest = Sha256Hash.digest_hex(b"anything");
        assert_eq!(digest.len(), Sha256Hash.digest_hex_len());
        assert!(is_hex_digest(&digest, Sha256Hash.digest_hex_len()));
    }

    #[test]
    fn test_salted_digest_is_concatenation() {
        let salt = Salt::new("pepper-pepper-pepper");
        assert_eq!(
            salted_digest(&Sha256Hash, "user-1", &salt),
            Sha256Hash.digest_hex(b"user-1pepper-pepper-pepper")
        );
    }

    #[test]
    fn test_salt_debug_is_redacted() {
        let salt = Salt::new("super-secret-salt-value");
        let debug = format!("{:?}", salt);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_is_hex_digest() {
        assert!(!is_hex_digest("user-1", 64));
        assert!(!is_hex_digest(&"g".repeat(64), 64));
        assert!(is_hex_digest(&"a".repeat(64), 64));
    }
}
