//! Routing-outcome notifications for external collaborators.
//!
//! After every successful routing decision the [`Router`](crate::Router)
//! hands four events to each registered observer: which server served the
//! key, how long the lookup took, which key was accessed, and the full
//! request record. Observers are best-effort telemetry. An observer that
//! returns an error or panics is logged and skipped; the routing result is
//! unaffected.

use std::time::{Duration, SystemTime};

use crate::node::ServerId;

/// Error reported by an observer. Contained by the router, never returned
/// to routing callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ObserverError(pub String);

impl ObserverError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Result type for observer callbacks.
pub type ObserverResult = std::result::Result<(), ObserverError>;

/// Receiver of routing events.
///
/// Every method defaults to a no-op, so collaborators implement only the
/// events they account for. Implementations are called on the routing
/// thread and should return quickly.
pub trait RoutingObserver: Send + Sync {
    /// `server` handled one request.
    fn notify_served(&self, _server: ServerId) -> ObserverResult {
        Ok(())
    }

    /// One routing-latency sample.
    fn notify_latency(&self, _latency: Duration) -> ObserverResult {
        Ok(())
    }

    /// `key` was requested once.
    fn notify_accessed(&self, _key: &str) -> ObserverResult {
        Ok(())
    }

    /// Complete record of one routed request.
    fn notify_request(
        &self,
        _key: &str,
        _server: ServerId,
        _latency: Duration,
        _timestamp: SystemTime,
    ) -> ObserverResult {
        Ok(())
    }
}
