//! Idempotency-key derivation.
//!
//! A request's key is the SHA-256 of its canonicalized payload. Byte-identical
//! payloads always map to the same key; any difference yields a practically
//! unique one, so the key doubles as the cache and retrieval identifier.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lowercase-hex SHA-256 digest identifying one request payload.
/// Immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reconstructs a key from its hex form (retrieval path). Rejects anything
    /// that is not exactly a lowercase-hex SHA-256 digest.
    pub fn parse(s: &str) -> Option<Self> {
        let valid = s.len() == 64
            && s.bytes()
                .all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase());
        valid.then(|| RequestKey(s.to_string()))
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the idempotency key for a canonicalized payload.
/// Pure and total: any byte sequence, including empty, produces a valid key.
pub fn derive_key(content: &[u8]) -> RequestKey {
    use std::fmt::Write;

    let digest = Sha256::digest(content);
    let mut hex = String::with_capacity(64);
    for byte in digest {
        // write! to a String is infallible
        let _ = write!(hex, "{byte:02x}");
    }
    RequestKey(hex)
}

/// Canonicalizes a job-description payload before hashing: surrounding
/// whitespace carries no meaning, everything else is significant bytes.
pub fn canonical_payload(job_info: &str) -> &[u8] {
    job_info.trim().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_content_same_key() {
        let content = b"Senior backend engineer, distributed systems";
        for _ in 0..50 {
            assert_eq!(derive_key(content), derive_key(content));
        }
    }

    #[test]
    fn test_empty_content_is_valid() {
        let key = derive_key(b"");
        assert_eq!(key.as_str().len(), 64);
        // well-known SHA-256 of the empty string
        assert_eq!(
            key.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_distinct_contents_distinct_keys() {
        let mut seen = HashSet::new();
        for i in 0..10_000u32 {
            let content = format!("job posting variant {i}");
            assert!(seen.insert(derive_key(content.as_bytes())));
        }
    }

    #[test]
    fn test_canonical_payload_trims_surrounding_whitespace() {
        assert_eq!(
            derive_key(canonical_payload("  rust engineer \n")),
            derive_key(canonical_payload("rust engineer"))
        );
        // interior whitespace stays significant
        assert_ne!(
            derive_key(canonical_payload("rust  engineer")),
            derive_key(canonical_payload("rust engineer"))
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let key = derive_key(b"anything");
        assert_eq!(RequestKey::parse(key.as_str()), Some(key));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(RequestKey::parse("not-a-key").is_none());
        assert!(RequestKey::parse("").is_none());
        assert!(RequestKey::parse(&"A".repeat(64)).is_none());
        assert!(RequestKey::parse(&"a".repeat(63)).is_none());
    }
}
