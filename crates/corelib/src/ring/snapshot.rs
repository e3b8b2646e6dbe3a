//! Read-only, point-in-time view of the ring.

use std::collections::{BTreeMap, BTreeSet};

use crate::node::ServerId;
use crate::vnode::VirtualNode;

/// Size of the position space (2^64) as a float, for ownership fractions.
const RING_SPAN: f64 = 18_446_744_073_709_551_616.0;

/// Immutable copy of the ring's entries, ordered by position.
///
/// Taken under the ring's read guard, so it is self-consistent. Changes to
/// the live ring after the snapshot was taken are not reflected, and the
/// snapshot offers no way to mutate the ring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingSnapshot {
    entries: BTreeMap<u64, VirtualNode>,
}

impl RingSnapshot {
    pub(crate) fn new(entries: BTreeMap<u64, VirtualNode>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &VirtualNode)> + '_ {
        self.entries.iter().map(|(position, vnode)| (*position, vnode))
    }

    /// Entry with the smallest position.
    pub fn first(&self) -> Option<(u64, &VirtualNode)> {
        self.entries.iter().next().map(|(position, vnode)| (*position, vnode))
    }

    /// Entry owning `position`: smallest position `>= position`, wrapping to
    /// the first entry.
    pub fn successor(&self, position: u64) -> Option<&VirtualNode> {
        self.entries
            .range(position..)
            .next()
            .or_else(|| self.entries.iter().next())
            .map(|(_, vnode)| vnode)
    }

    /// Distinct servers present on the ring.
    pub fn servers(&self) -> BTreeSet<ServerId> {
        self.entries.values().map(VirtualNode::server).collect()
    }

    /// Number of entries owned by `server`.
    pub fn entries_for(&self, server: ServerId) -> usize {
        self.entries.values().filter(|vnode| vnode.server == server).count()
    }

    /// Fraction of the ring's circumference owned by each server.
    ///
    /// An entry owns the arc from its predecessor (exclusive) up to itself
    /// (inclusive); the first entry's arc wraps past the top of the space.
    /// Fractions sum to 1 for a non-empty ring.
    pub fn ownership(&self) -> BTreeMap<ServerId, f64> {
        let mut shares = BTreeMap::new();

        if self.entries.len() == 1 {
            if let Some((_, vnode)) = self.first() {
                shares.insert(vnode.server, 1.0);
            }
            return shares;
        }

        let mut previous = match self.entries.keys().next_back() {
            Some(last) => *last,
            None => return shares,
        };
        for (position, vnode) in &self.entries {
            let arc = clockwise_distance(previous, *position) as f64 / RING_SPAN;
            *shares.entry(vnode.server).or_insert(0.0) += arc;
            previous = *position;
        }

        shares
    }
}

/// Clockwise distance from `from` to `to` on the ring.
fn clockwise_distance(from: u64, to: u64) -> u64 {
    if to >= from {
        to - from
    } else {
        (u64::MAX - from) + to + 1
    }
}
