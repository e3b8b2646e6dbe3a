//! Server membership and virtual-node placement.
//!
//! The membership manager owns the authoritative set of live servers and the
//! replication factor, and translates membership changes into ring
//! mutations.
//!
//! Locking: the replication factor sits behind a reader-writer lock that
//! doubles as the membership lock. `add_server` and `remove_server` hold it
//! shared, so they interleave freely with each other; `set_replication_factor`
//! holds it exclusively for the whole clear-and-rebuild sequence.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::node::{Server, ServerId};
use crate::ring::HashRing;
use crate::vnode::VirtualNode;

/// Virtual nodes per server when none is configured.
pub const DEFAULT_REPLICATION_FACTOR: usize = 3;

/// Live server set plus the rules for placing them on the ring.
#[derive(Debug)]
pub struct MembershipManager {
    ring: Arc<HashRing>,
    servers: DashMap<ServerId, Server>,
    next_id: AtomicU32,
    replication_factor: RwLock<usize>,
}

impl MembershipManager {
    /// Create an empty membership over `ring` with the default replication
    /// factor.
    pub fn new(ring: Arc<HashRing>) -> Self {
        Self {
            ring,
            servers: DashMap::new(),
            next_id: AtomicU32::new(0),
            replication_factor: RwLock::new(DEFAULT_REPLICATION_FACTOR),
        }
    }

    /// Create an empty membership with an explicit replication factor.
    ///
    /// # Errors
    /// [`Error::InvalidReplicationFactor`] if `replication_factor` is zero.
    pub fn with_replication_factor(ring: Arc<HashRing>, replication_factor: usize) -> Result<Self> {
        validate_replication_factor(replication_factor)?;
        let manager = Self::new(ring);
        *manager.replication_factor.write() = replication_factor;
        Ok(manager)
    }

    /// Allocate a new server and place its virtual nodes on the ring.
    ///
    /// The server's entries are inserted before it becomes visible in the
    /// live set, so a live server always has ring entries.
    ///
    /// # Panics
    /// If the `u32` id space is exhausted; see [`try_add_server`](Self::try_add_server).
    pub fn add_server(&self) -> ServerId {
        match self.try_add_server() {
            Ok(id) => id,
            Err(err) => panic!("cannot add server: {err}"),
        }
    }

    /// Like [`add_server`](Self::add_server), but reports id exhaustion
    /// instead of panicking.
    ///
    /// Ids are allocated monotonically and never wrap, so an id handed out
    /// once is never handed out again, live or not.
    ///
    /// # Errors
    /// [`Error::ServerIdsExhausted`] once `u32::MAX` ids have been allocated;
    /// the ring is left unchanged.
    pub fn try_add_server(&self) -> Result<ServerId> {
        let factor = self.replication_factor.read();
        let id = self
            .next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| next.checked_add(1))
            .map(ServerId)
            .map_err(|_| Error::ServerIdsExhausted)?;

        self.ring.add_virtual_nodes(virtual_nodes(id, *factor));
        self.servers.insert(id, Server::new(id));
        debug!(server = %id, vnodes = *factor, "added server");
        drop(factor);

        self.publish_gauges();
        Ok(id)
    }

    /// Remove a server and all of its virtual nodes.
    ///
    /// Returns `false` (and leaves the ring untouched) if `id` is not live.
    pub fn remove_server(&self, id: ServerId) -> bool {
        let guard = self.replication_factor.read();

        if self.servers.remove(&id).is_none() {
            debug!(server = %id, "ignoring removal of unknown server");
            return false;
        }
        let removed = self.ring.remove_server(id);
        debug!(server = %id, vnodes = removed, "removed server");
        drop(guard);

        self.publish_gauges();
        true
    }

    /// Change the number of virtual nodes per server and rebuild the ring.
    ///
    /// Every live server's virtual nodes are destroyed and re-derived with
    /// the new factor, so nearly every key may move. Lookups running
    /// concurrently can observe a partially rebuilt ring.
    ///
    /// # Errors
    /// [`Error::InvalidReplicationFactor`] if `replication_factor` is zero;
    /// the ring is left unchanged.
    pub fn set_replication_factor(&self, replication_factor: usize) -> Result<()> {
        validate_replication_factor(replication_factor)?;

        let mut factor = self.replication_factor.write();
        *factor = replication_factor;

        self.ring.clear();
        let servers = self.sorted_server_ids();
        for id in &servers {
            self.ring.add_virtual_nodes(virtual_nodes(*id, replication_factor));
        }
        info!(
            replication_factor,
            servers = servers.len(),
            vnodes = self.ring.len(),
            "rebuilt ring"
        );
        drop(factor);

        self.publish_gauges();
        Ok(())
    }

    pub fn replication_factor(&self) -> usize {
        *self.replication_factor.read()
    }

    /// Live server ids in ascending order.
    pub fn servers(&self) -> Vec<ServerId> {
        self.sorted_server_ids()
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn is_live(&self, id: ServerId) -> bool {
        self.servers.contains_key(&id)
    }

    /// The ring this manager places servers on.
    pub fn ring(&self) -> &Arc<HashRing> {
        &self.ring
    }

    fn sorted_server_ids(&self) -> Vec<ServerId> {
        let mut ids: Vec<ServerId> = self.servers.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    fn publish_gauges(&self) {
        metrics::gauge!("ring_servers").set(self.servers.len() as f64);
        metrics::gauge!("ring_virtual_nodes").set(self.ring.len() as f64);
    }
}

fn validate_replication_factor(replication_factor: usize) -> Result<()> {
    if replication_factor == 0 {
        return Err(Error::InvalidReplicationFactor(replication_factor));
    }
    Ok(())
}

/// The `replication_factor` virtual nodes of `id`: labels `"{id}_0"` ..
/// `"{id}_{k-1}"`.
fn virtual_nodes(id: ServerId, replication_factor: usize) -> impl Iterator<Item = VirtualNode> {
    (0..replication_factor).map(move |index| VirtualNode::from_index(id, index))
}
