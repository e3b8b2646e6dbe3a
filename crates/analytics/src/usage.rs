//! Per-server load accounting.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use corelib::ServerId;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use crate::stats;

/// Counts how many requests each server handled.
///
/// Forgotten servers stay forgotten: a late `record` for a server removed
/// via [`forget`](Self::forget) is dropped rather than resurrecting its
/// counter. Server ids are never reused, so this cannot hide a new server.
#[derive(Debug, Default)]
pub struct UsageTracker {
    served: DashMap<ServerId, AtomicU64>,
    retired: DashSet<ServerId>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `server` at zero, so idle servers count towards the
    /// spread. Existing counters are left alone.
    pub fn register(&self, server: ServerId) {
        self.retired.remove(&server);
        self.served.entry(server).or_default();
    }

    /// Count one request served by `server`. Ignored for forgotten servers.
    pub fn record(&self, server: ServerId) {
        if let Some(counter) = self.served.get(&server) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        // The retired check runs under the shard lock of `served`, so it
        // cannot interleave with the removal in `forget`.
        match self.served.entry(server) {
            Entry::Occupied(counter) => {
                counter.get().fetch_add(1, Ordering::Relaxed);
            }
            Entry::Vacant(slot) => {
                if !self.retired.contains(&server) {
                    slot.insert(AtomicU64::new(1));
                }
            }
        }
    }

    /// Stop tracking a removed server, including requests still in flight
    /// to it.
    pub fn forget(&self, server: ServerId) {
        self.retired.insert(server);
        self.served.remove(&server);
    }

    pub fn served_by(&self, server: ServerId) -> u64 {
        self.served
            .get(&server)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Current counters, ordered by server id.
    pub fn load(&self) -> BTreeMap<ServerId, u64> {
        self.served
            .iter()
            .map(|entry| (*entry.key(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.served.iter().map(|e| e.value().load(Ordering::Relaxed)).sum()
    }

    /// Standard deviation of served counts across tracked servers.
    pub fn std_deviation(&self) -> f64 {
        let values: Vec<u64> = self.load().into_values().collect();
        stats::std_deviation(&values)
    }

    pub fn reset(&self) {
        for entry in self.served.iter() {
            entry.value().store(0, Ordering::Relaxed);
        }
    }
}
