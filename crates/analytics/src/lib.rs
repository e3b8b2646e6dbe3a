//! Routing telemetry collaborators.
//!
//! These consume the events a [`corelib::Router`] emits after each routing
//! decision and contain no routing logic themselves:
//! - Per-server load accounting and spread statistics
//! - Routing latency (average and percentiles)
//! - Hot-key detection
//! - Request history for replay

pub mod collector;
pub mod history;
pub mod hot_keys;
pub mod latency;
pub mod stats;
pub mod usage;

pub use collector::{Analytics, StatsReport};
pub use history::{RequestRecord, RequestTracker};
pub use hot_keys::HotKeyDetector;
pub use latency::LatencyTracker;
pub use usage::UsageTracker;
