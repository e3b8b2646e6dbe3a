//! SipHash-1-3 hash function.

use crate::hash::traits::HashFunction;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// SipHash-1-3 with zero keys, so positions are stable across processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SipHash13;

impl HashFunction for SipHash13 {
    fn hash(&self, key: &str) -> u64 {
        let mut hasher = SipHasher13::new();
        hasher.write(key.as_bytes());
        hasher.finish()
    }

    fn name(&self) -> &'static str {
        "siphash13"
    }
}
