//! Request history for replay.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use corelib::ServerId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One routed request. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub key: String,
    pub server: ServerId,
    pub latency_ns: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl RequestRecord {
    pub fn new(key: &str, server: ServerId, latency: Duration, timestamp: SystemTime) -> Self {
        Self {
            key: key.to_owned(),
            server,
            latency_ns: u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX),
            timestamp_ms: timestamp
                .duration_since(UNIX_EPOCH)
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or(0),
        }
    }
}

impl fmt::Display for RequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key={} server={} latency={:.3}ms at={}",
            self.key,
            self.server,
            self.latency_ns as f64 / 1_000_000.0,
            self.timestamp_ms
        )
    }
}

/// Append-only log of routed requests, replayable in arrival order.
///
/// Unbounded by default. A bounded tracker drops the oldest records once
/// full, so replay covers the most recent `limit` requests; a limit of 0
/// keeps nothing.
#[derive(Debug, Default)]
pub struct RequestTracker {
    history: Mutex<VecDeque<RequestRecord>>,
    limit: Option<usize>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(limit: usize) -> Self {
        Self {
            history: Mutex::new(VecDeque::new()),
            limit: Some(limit),
        }
    }

    pub fn record(&self, record: RequestRecord) {
        if self.limit == Some(0) {
            return;
        }
        let mut history = self.history.lock();
        if let Some(limit) = self.limit {
            while history.len() >= limit {
                history.pop_front();
            }
        }
        history.push_back(record);
    }

    /// Copy of the recorded requests, oldest first.
    pub fn replay(&self) -> Vec<RequestRecord> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str) -> RequestRecord {
        RequestRecord::new(key, ServerId(1), Duration::from_nanos(1_500), UNIX_EPOCH + Duration::from_secs(2))
    }

    #[test]
    fn test_record_fields() {
        let r = record("user-1");
        assert_eq!(r.latency_ns, 1_500);
        assert_eq!(r.timestamp_ms, 2_000);
    }

    #[test]
    fn test_replay_in_order() {
        let tracker = RequestTracker::new();
        for key in ["a", "b", "c"] {
            tracker.record(record(key));
        }
        let keys: Vec<String> = tracker.replay().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_bounded_drops_oldest() {
        let tracker = RequestTracker::bounded(2);
        for key in ["a", "b", "c"] {
            tracker.record(record(key));
        }
        let keys: Vec<String> = tracker.replay().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let tracker = RequestTracker::bounded(0);
        tracker.record(record("a"));
        assert!(tracker.is_empty());
        assert!(tracker.replay().is_empty());
    }
}
