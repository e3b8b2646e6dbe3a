//! BLAKE3 digest hash function (default).

use crate::hash::traits::HashFunction;

/// Cryptographic digest hash: BLAKE3 of the key, truncated to the first
/// 8 bytes read as a big-endian `u64`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Hash;

impl HashFunction for Blake3Hash {
    fn hash(&self, key: &str) -> u64 {
        let digest = blake3::hash(key.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_be_bytes(prefix)
    }

    fn name(&self) -> &'static str {
        "blake3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_digest_prefix() {
        let digest = blake3::hash(b"user-42");
        let bytes = digest.as_bytes();
        let expected = bytes[..8]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));

        assert_eq!(Blake3Hash.hash("user-42"), expected);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(Blake3Hash.hash("0_0"), Blake3Hash.hash("0_0"));
        assert_ne!(Blake3Hash.hash("0_0"), Blake3Hash.hash("0_1"));
    }
}
