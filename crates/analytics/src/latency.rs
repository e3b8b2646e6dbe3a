//! Routing latency accounting.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

/// Samples kept for percentile queries when no capacity is given.
pub const DEFAULT_RESERVOIR: usize = 10_000;

/// Running latency totals plus a window of the most recent samples.
///
/// Count and total are exact over every sample ever recorded; percentiles
/// are computed over the window only.
#[derive(Debug)]
pub struct LatencyTracker {
    total_ns: AtomicU64,
    count: AtomicU64,
    recent: Mutex<VecDeque<u64>>,
    capacity: usize,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RESERVOIR)
    }

    /// Tracker keeping at most `capacity` recent samples (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
            recent: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, latency: Duration) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let mut recent = self.recent.lock();
        if recent.len() == self.capacity {
            recent.pop_front();
        }
        recent.push_back(nanos);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Mean latency in milliseconds; `0.0` before any sample.
    pub fn average_ms(&self) -> f64 {
        let total = self.total_ns.load(Ordering::Relaxed) as f64 / 1_000_000.0;
        total / self.count().max(1) as f64
    }

    /// Nearest-rank percentile (`p` in `0.0..=100.0`) over the recent
    /// window, or `None` when no sample has been recorded.
    pub fn percentile(&self, p: f64) -> Option<Duration> {
        let mut samples: Vec<u64> = self.recent.lock().iter().copied().collect();
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let p = p.clamp(0.0, 100.0);
        let rank = ((p / 100.0) * samples.len() as f64).ceil() as usize;
        let index = rank.saturating_sub(1).min(samples.len() - 1);
        Some(Duration::from_nanos(samples[index]))
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let latency = LatencyTracker::new();
        assert_eq!(latency.average_ms(), 0.0);
        assert_eq!(latency.percentile(50.0), None);
    }

    #[test]
    fn test_average() {
        let latency = LatencyTracker::new();
        latency.record(Duration::from_millis(1));
        latency.record(Duration::from_millis(3));
        assert_eq!(latency.count(), 2);
        assert!((latency.average_ms() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentiles() {
        let latency = LatencyTracker::new();
        for us in 1..=100 {
            latency.record(Duration::from_micros(us));
        }
        assert_eq!(latency.percentile(50.0), Some(Duration::from_micros(50)));
        assert_eq!(latency.percentile(99.0), Some(Duration::from_micros(99)));
        assert_eq!(latency.percentile(100.0), Some(Duration::from_micros(100)));
        assert_eq!(latency.percentile(0.0), Some(Duration::from_micros(1)));
    }

    #[test]
    fn test_window_keeps_most_recent() {
        let latency = LatencyTracker::with_capacity(2);
        latency.record(Duration::from_nanos(100));
        latency.record(Duration::from_nanos(1));
        latency.record(Duration::from_nanos(2));

        assert_eq!(latency.count(), 3);
        assert_eq!(latency.percentile(100.0), Some(Duration::from_nanos(2)));
    }
}
