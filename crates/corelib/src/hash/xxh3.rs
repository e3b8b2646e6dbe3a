//! XXH3 hash function.

use crate::hash::traits::HashFunction;
use xxhash_rust::xxh3::xxh3_64;

/// XXH3 64-bit. Fastest of the provided variants; not cryptographic.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3Hash;

impl HashFunction for Xxh3Hash {
    fn hash(&self, key: &str) -> u64 {
        xxh3_64(key.as_bytes())
    }

    fn name(&self) -> &'static str {
        "xxh3"
    }
}
