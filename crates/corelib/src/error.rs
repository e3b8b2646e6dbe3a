//! Error types for the core library.

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// Every variant is a caller-context error: none of them is transient, so
/// nothing in this crate retries on them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Replication factor (virtual nodes per server) must be positive.
    #[error("invalid replication factor: {0} (must be at least 1)")]
    InvalidReplicationFactor(usize),

    /// Requested hash function is not known to this build.
    #[error("unknown hash function: {0}")]
    UnknownHashFunction(String),

    /// Lookup on a ring with no virtual nodes. This is not a miss: a
    /// non-empty ring always resolves a key thanks to wraparound.
    #[error("hash ring is empty: no servers available for routing")]
    EmptyRing,

    /// Every `u32` server id has been handed out. Ids are never reused.
    #[error("server id space exhausted")]
    ServerIdsExhausted,

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Config(err.to_string())
    }
}
