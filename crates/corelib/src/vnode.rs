//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Virtual nodes are a technique to improve load distribution in consistent hashing.
//! Instead of each server having a single position on the ring, each server has
//! multiple positions (virtual nodes). This provides:
//!
//! 1. **Better Load Distribution**: More positions = smoother distribution of keys
//! 2. **Gradual Rebalancing**: When servers join/leave, only a fraction of keys move
//! 3. **Fault Tolerance**: Losing one server spreads its keys over many successors
//!
//! # Labels
//!
//! A virtual node is identified by its label, `"{server_id}_{replica_index}"`
//! for `replica_index` in `[0, replication_factor)`. The ring position is the
//! hash of that label, so a given server id and replication factor always
//! produce the same positions. This is what lets a full rebuild restore the
//! exact same ring.
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(r) per server where r = replication factor
//! - **Lookup**: O(log n) where n = total vnodes
//! - **Rebalancing**: ~k/N keys move when one of N servers joins or leaves

use std::fmt;
use std::sync::Arc;

use crate::node::ServerId;

/// A virtual node on the hash ring.
///
/// Represents a single ring position owned by a server.
///
/// # Invariants
///
/// - Every `VirtualNode` belongs to exactly one server and never outlives it
/// - Virtual nodes are never shared between servers (the label embeds the id)
///
/// Cloning is cheap: the label is reference counted, so `locate` can hand
/// out owned copies without allocating.
///
/// # Example
///
/// ```rust
/// use corelib::{ServerId, VirtualNode};
///
/// let vnode = VirtualNode::from_index(ServerId(1), 0);
/// assert_eq!(vnode.label(), "1_0");
/// assert_eq!(vnode.server(), ServerId(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualNode {
    /// The server that owns this virtual node.
    ///
    /// Many virtual nodes share the same `server` (that's the point!).
    /// When looking up a key, we find the vnode, then use this id to
    /// route to the server.
    pub server: ServerId,

    /// Deterministic label, hashed to obtain the ring position.
    pub label: Arc<str>,
}

impl VirtualNode {
    /// Create a virtual node with an explicit label.
    ///
    /// Prefer [`VirtualNode::from_index`]; this exists for tests that need
    /// to control positions precisely.
    pub fn new(server: ServerId, label: impl Into<Arc<str>>) -> Self {
        Self {
            server,
            label: label.into(),
        }
    }

    /// Create the `replica_index`-th virtual node of `server`.
    ///
    /// # Arguments
    /// * `server` - The owning server
    /// * `replica_index` - Index in `[0, replication_factor)`
    ///
    /// # Example
    /// ```rust
    /// use corelib::{ServerId, VirtualNode};
    ///
    /// let vnode0 = VirtualNode::from_index(ServerId(7), 0);
    /// let vnode1 = VirtualNode::from_index(ServerId(7), 1);
    /// assert_ne!(vnode0.label(), vnode1.label());
    /// ```
    pub fn from_index(server: ServerId, replica_index: usize) -> Self {
        Self::new(server, format!("{}_{}", server, replica_index))
    }

    /// Get the label.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the owning server id.
    #[inline]
    pub fn server(&self) -> ServerId {
        self.server
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Server {})", self.label, self.server)
    }
}
