//! Router configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::membership::DEFAULT_REPLICATION_FACTOR;

/// Configuration for a [`Router`](crate::Router).
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
///
/// ```rust
/// use corelib::{HashAlgorithm, RouterConfig};
///
/// let config = RouterConfig::from_json(r#"{ "replication_factor": 100, "hash": "xxh3" }"#).unwrap();
/// assert_eq!(config.replication_factor, 100);
/// assert_eq!(config.hash, HashAlgorithm::Xxh3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Virtual nodes per server.
    pub replication_factor: usize,

    /// Hash function used for both virtual-node labels and request keys.
    pub hash: HashAlgorithm,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            hash: HashAlgorithm::default(),
        }
    }
}

impl RouterConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.replication_factor == 0 {
            return Err(Error::InvalidReplicationFactor(self.replication_factor));
        }
        Ok(())
    }
}
