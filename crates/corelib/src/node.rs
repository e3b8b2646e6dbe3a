//! Server abstractions for the consistent hash ring.
//!
//! Servers are the physical participants that keys are routed to. They are
//! identified by a compact `ServerId` that is cheap to compare and hash.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Compact identifier for a server.
///
/// Ids are allocated monotonically by the membership manager and never
/// collide with a currently live server.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub u32);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ServerId {
    fn from(id: u32) -> Self {
        ServerId(id)
    }
}

/// Server participating in the ring.
///
/// Keep this struct small and cheap to clone; per-server accounting (load,
/// latency) lives with the routing observers, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Server {
    pub id: ServerId,
}

impl Server {
    pub fn new(id: ServerId) -> Self {
        Self { id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_id_display_is_plain_decimal() {
        // Virtual node labels are built from this representation.
        assert_eq!(ServerId(42).to_string(), "42");
    }
}
