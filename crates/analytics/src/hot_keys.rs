//! Hot-key detection: per-key access frequency.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Counts accesses per key and reports the most frequent ones.
#[derive(Debug, Default)]
pub struct HotKeyDetector {
    frequency: DashMap<String, AtomicU64>,
}

impl HotKeyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, key: &str) {
        if let Some(count) = self.frequency.get(key) {
            count.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.frequency
            .entry(key.to_owned())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self, key: &str) -> u64 {
        self.frequency
            .get(key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Number of distinct keys seen.
    pub fn distinct_keys(&self) -> usize {
        self.frequency.len()
    }

    /// The `k` most frequent keys, by count descending, ties by key.
    pub fn top(&self, k: usize) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = self
            .frequency
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();
        counts.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(k);
        counts
    }
}
