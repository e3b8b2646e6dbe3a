//! Hash function abstraction for the ring.
//!
//! Hash functions convert virtual-node labels and request keys into
//! positions on the ring. Both go through the same function, which is what
//! makes "the first virtual node at or after the key" meaningful.

pub mod digest;
pub mod sip;
pub mod traits;
pub mod xxh3;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use digest::Blake3Hash;
pub use sip::SipHash13;
pub use traits::HashFunction;
pub use xxh3::Xxh3Hash;

/// Selector for the provided hash functions, used by configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    SipHash13,
    Xxh3,
}

impl HashAlgorithm {
    /// Instantiates the selected hash function.
    pub fn build(self) -> Arc<dyn HashFunction> {
        match self {
            HashAlgorithm::Blake3 => Arc::new(Blake3Hash),
            HashAlgorithm::SipHash13 => Arc::new(SipHash13),
            HashAlgorithm::Xxh3 => Arc::new(Xxh3Hash),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::SipHash13 => "siphash13",
            HashAlgorithm::Xxh3 => "xxh3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(HashAlgorithm::Blake3),
            "siphash13" | "sip" => Ok(HashAlgorithm::SipHash13),
            "xxh3" => Ok(HashAlgorithm::Xxh3),
            _ => Err(Error::UnknownHashFunction(s.to_string())),
        }
    }
}
