//! Hash ring data structure.
//!
//! Holds a `BTreeMap<u64, VirtualNode>` behind a reader-writer lock and the
//! lookup logic. Readers never block each other; writers take the lock only
//! for the duration of a single map mutation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::hash::{Blake3Hash, HashFunction};
use crate::node::ServerId;
use crate::ring::snapshot::RingSnapshot;
use crate::vnode::VirtualNode;

/// Consistent hash ring: ring position -> virtual node.
///
/// The ring is an explicitly owned object; share it through `Arc<HashRing>`.
/// All methods take `&self`.
pub struct HashRing {
    entries: RwLock<BTreeMap<u64, VirtualNode>>,
    hasher: Arc<dyn HashFunction>,
}

impl HashRing {
    /// Create an empty ring using the default hash function (BLAKE3).
    pub fn new() -> Self {
        Self::with_hash_function(Arc::new(Blake3Hash))
    }

    /// Create an empty ring using the given hash function.
    pub fn with_hash_function(hasher: Arc<dyn HashFunction>) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            hasher,
        }
    }

    /// Insert a virtual node at `hash(label)`.
    ///
    /// An existing entry at the same position is overwritten (last write
    /// wins). With a 64-bit position space this is not expected in practice.
    pub fn add_virtual_node(&self, vnode: VirtualNode) {
        let position = self.hasher.hash(vnode.label());
        let previous = self.entries.write().insert(position, vnode);
        if let Some(previous) = previous {
            debug!(position, overwritten = %previous, "ring position collision");
        }
    }

    /// Insert several virtual nodes under a single write guard, so readers
    /// see either none or all of them.
    pub fn add_virtual_nodes<I>(&self, vnodes: I)
    where
        I: IntoIterator<Item = VirtualNode>,
    {
        let positioned: Vec<(u64, VirtualNode)> = vnodes
            .into_iter()
            .map(|vnode| (self.hasher.hash(vnode.label()), vnode))
            .collect();

        let mut entries = self.entries.write();
        for (position, vnode) in positioned {
            if let Some(previous) = entries.insert(position, vnode) {
                debug!(position, overwritten = %previous, "ring position collision");
            }
        }
    }

    /// Find the virtual node responsible for `key`.
    ///
    /// Returns the entry at the smallest position `>= hash(key)`, wrapping
    /// to the smallest position in the ring when there is none. Both the
    /// successor search and the wraparound read the same guard.
    ///
    /// # Errors
    /// [`Error::EmptyRing`] if the ring has no entries.
    pub fn locate(&self, key: &str) -> Result<VirtualNode> {
        let position = self.hasher.hash(key);
        let entries = self.entries.read();
        let vnode = entries
            .range(position..)
            .next()
            .or_else(|| entries.iter().next())
            .map(|(_, vnode)| vnode.clone())
            .ok_or(Error::EmptyRing)?;
        trace!(key, position, vnode = %vnode, "located");
        Ok(vnode)
    }

    /// Remove every entry owned by `server`. Returns the number removed.
    ///
    /// Linear in ring size; membership changes are rare next to lookups.
    pub fn remove_server(&self, server: ServerId) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, vnode| vnode.server != server);
        before - entries.len()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Point-in-time copy of the ring, in position order.
    pub fn snapshot(&self) -> RingSnapshot {
        RingSnapshot::new(self.entries.read().clone())
    }

    /// Number of entries (virtual nodes) on the ring.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Ring position of an arbitrary key under this ring's hash function.
    pub fn position_of(&self, key: &str) -> u64 {
        self.hasher.hash(key)
    }

    pub fn hash_function_name(&self) -> &'static str {
        self.hasher.name()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("entries", &self.len())
            .field("hash_function", &self.hasher.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hash function that parses the key as a number, so tests can place
    /// entries and keys at exact positions.
    struct Literal;

    impl HashFunction for Literal {
        fn hash(&self, key: &str) -> u64 {
            key.rsplit(':').next().and_then(|n| n.parse().ok()).unwrap_or(0)
        }

        fn name(&self) -> &'static str {
            "literal"
        }
    }

    fn literal_ring() -> HashRing {
        let ring = HashRing::with_hash_function(Arc::new(Literal));
        ring.add_virtual_node(VirtualNode::new(ServerId(1), "a:100"));
        ring.add_virtual_node(VirtualNode::new(ServerId(2), "b:200"));
        ring.add_virtual_node(VirtualNode::new(ServerId(3), "c:300"));
        ring
    }

    #[test]
    fn test_empty_ring_locate_fails() {
        let ring = HashRing::new();
        assert_eq!(ring.locate("key"), Err(Error::EmptyRing));
    }

    #[test]
    fn test_locate_exact_position() {
        let ring = literal_ring();
        assert_eq!(ring.locate("k:200").unwrap().server(), ServerId(2));
    }

    #[test]
    fn test_locate_successor() {
        let ring = literal_ring();
        assert_eq!(ring.locate("k:101").unwrap().server(), ServerId(2));
        assert_eq!(ring.locate("k:0").unwrap().server(), ServerId(1));
    }

    #[test]
    fn test_locate_wraps_to_first_entry() {
        let ring = literal_ring();
        assert_eq!(ring.locate("k:301").unwrap().server(), ServerId(1));
        assert_eq!(ring.locate(&format!("k:{}", u64::MAX)).unwrap().label(), "a:100");
    }

    #[test]
    fn test_collision_last_write_wins() {
        let ring = literal_ring();
        ring.add_virtual_node(VirtualNode::new(ServerId(9), "z:200"));

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.locate("k:150").unwrap().server(), ServerId(9));
    }

    #[test]
    fn test_remove_server_drops_only_its_entries() {
        let ring = literal_ring();
        ring.add_virtual_node(VirtualNode::new(ServerId(2), "b:250"));

        assert_eq!(ring.remove_server(ServerId(2)), 2);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.locate("k:150").unwrap().server(), ServerId(3));
        assert_eq!(ring.remove_server(ServerId(2)), 0);
    }

    #[test]
    fn test_clear() {
        let ring = literal_ring();
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.locate("k:1"), Err(Error::EmptyRing));
    }

    #[test]
    fn test_batch_insert() {
        let ring = HashRing::new();
        ring.add_virtual_nodes((0..5).map(|i| VirtualNode::from_index(ServerId(4), i)));
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let ring = literal_ring();
        let snapshot = ring.snapshot();
        ring.clear();

        assert_eq!(snapshot.len(), 3);
        assert!(ring.is_empty());
    }
}
