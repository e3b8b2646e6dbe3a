//! All collaborators behind one routing observer.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime};

use corelib::{ObserverResult, RoutingObserver, ServerId};
use serde::Serialize;
use tracing::debug;

use crate::history::{RequestRecord, RequestTracker};
use crate::hot_keys::HotKeyDetector;
use crate::latency::LatencyTracker;
use crate::usage::UsageTracker;

/// Usage, latency, hot-key and history accounting for a router.
///
/// Register it with [`RouterBuilder::with_observer`](corelib::RouterBuilder::with_observer)
/// and keep a clone of the `Arc` to read the numbers back.
#[derive(Debug, Default)]
pub struct Analytics {
    pub usage: UsageTracker,
    pub latency: LatencyTracker,
    pub hot_keys: HotKeyDetector,
    pub history: RequestTracker,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analytics whose request history keeps only the last `limit` records.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            history: RequestTracker::bounded(limit),
            ..Self::default()
        }
    }

    /// Start load accounting for a newly added server.
    pub fn server_added(&self, server: ServerId) {
        self.usage.register(server);
    }

    /// Drop load accounting for a removed server. Served events for it that
    /// arrive later are ignored.
    pub fn server_removed(&self, server: ServerId) {
        debug!(%server, served = self.usage.served_by(server), "dropping load counter");
        self.usage.forget(server);
    }

    /// Summary of everything collected so far.
    pub fn report(&self, top_keys: usize) -> StatsReport {
        StatsReport {
            load: self.usage.load(),
            std_deviation: self.usage.std_deviation(),
            requests: self.latency.count(),
            average_latency_ms: self.latency.average_ms(),
            p99_latency_ms: self
                .latency
                .percentile(99.0)
                .map(|d| d.as_secs_f64() * 1_000.0),
            hot_keys: self.hot_keys.top(top_keys),
        }
    }
}

impl RoutingObserver for Analytics {
    fn notify_served(&self, server: ServerId) -> ObserverResult {
        self.usage.record(server);
        Ok(())
    }

    fn notify_latency(&self, latency: Duration) -> ObserverResult {
        self.latency.record(latency);
        Ok(())
    }

    fn notify_accessed(&self, key: &str) -> ObserverResult {
        self.hot_keys.track(key);
        Ok(())
    }

    fn notify_request(
        &self,
        key: &str,
        server: ServerId,
        latency: Duration,
        timestamp: SystemTime,
    ) -> ObserverResult {
        self.history
            .record(RequestRecord::new(key, server, latency, timestamp));
        Ok(())
    }
}

/// Point-in-time statistics, printable and serializable.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub load: BTreeMap<ServerId, u64>,
    pub std_deviation: f64,
    pub requests: u64,
    pub average_latency_ms: f64,
    pub p99_latency_ms: Option<f64>,
    pub hot_keys: Vec<(String, u64)>,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- SYSTEM STATS ---")?;
        for (server, served) in &self.load {
            writeln!(f, "Server {server}: {served}")?;
        }
        writeln!(f, "Std Deviation: {:.3}", self.std_deviation)?;
        writeln!(f, "Requests: {}", self.requests)?;
        writeln!(f, "Avg Latency(ms): {:.6}", self.average_latency_ms)?;
        if let Some(p99) = self.p99_latency_ms {
            writeln!(f, "P99 Latency(ms): {p99:.6}")?;
        }
        let hot: Vec<String> = self
            .hot_keys
            .iter()
            .map(|(key, count)| format!("{key} ({count})"))
            .collect();
        write!(f, "Hot Keys: [{}]", hot.join(", "))
    }
}
