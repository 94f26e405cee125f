//! Cryptographic utilities

use sha2::{Digest, Sha256};

/// Hash a string using SHA-256
pub fn hash_string(input: &str) -> String {
    hex::encode(digest(input))
}

fn digest(input: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher.finalize().into()
}

/// Compare a presented secret with the expected one without leaking where they differ.
///
/// Both sides are hashed first so the comparison runs over equal-length digests.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (digest(presented), digest(expected));
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Short fingerprint of a secret, safe to log
pub fn fingerprint(secret: &str) -> String {
    hash_string(secret)[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_string() {
        let hash1 = hash_string("test");
        let hash2 = hash_string("test");
        let hash3 = hash_string("different");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("callback-secret", "callback-secret"));
        assert!(!secrets_match("callback-secre", "callback-secret"));
        assert!(!secrets_match("", "callback-secret"));
    }

    #[test]
    fn test_fingerprint_is_stable_prefix() {
        assert_eq!(fingerprint("s3cret"), hash_string("s3cret")[..8]);
    }
}
