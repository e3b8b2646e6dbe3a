//! Request routing: key -> server.
//!
//! The router is the entry point of the crate. It resolves keys through the
//! ring owned by its membership manager and is the single place where
//! routing outcomes are handed to [`RoutingObserver`]s.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use metrics::{counter, histogram};
use tracing::warn;

use crate::config::RouterConfig;
use crate::error::Result;
use crate::hash::{Blake3Hash, HashAlgorithm, HashFunction};
use crate::membership::{MembershipManager, DEFAULT_REPLICATION_FACTOR};
use crate::node::ServerId;
use crate::observer::{ObserverResult, RoutingObserver};
use crate::ring::{HashRing, RingSnapshot};
use crate::vnode::VirtualNode;

/// Routes request keys to servers.
///
/// `Router` is `Send + Sync`; share it behind an `Arc` to route from many
/// threads while membership changes happen concurrently.
///
/// # Example
///
/// ```rust
/// use corelib::Router;
///
/// let router = Router::new();
/// let a = router.add_server();
/// let b = router.add_server();
///
/// let owner = router.route("user-42").unwrap();
/// assert!(owner == a || owner == b);
/// assert_eq!(router.route("user-42").unwrap(), owner);
/// ```
pub struct Router {
    membership: MembershipManager,
    observers: Vec<Arc<dyn RoutingObserver>>,
}

impl Router {
    /// Router with the default hash function and replication factor and no
    /// observers.
    pub fn new() -> Self {
        Self {
            membership: MembershipManager::new(Arc::new(HashRing::new())),
            observers: Vec::new(),
        }
    }

    /// Start building a router.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Router configured from `config`, with no observers.
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        RouterBuilder::from_config(config).build()
    }

    /// Route `key` to the server that owns it.
    ///
    /// Deterministic for a fixed membership. Observers are notified before
    /// returning; their failures are logged and ignored.
    ///
    /// # Errors
    /// [`Error::EmptyRing`](crate::Error::EmptyRing) if no server is live.
    pub fn route(&self, key: &str) -> Result<ServerId> {
        self.route_vnode(key).map(|vnode| vnode.server())
    }

    /// Like [`route`](Self::route), but returns the virtual node that
    /// matched.
    pub fn route_vnode(&self, key: &str) -> Result<VirtualNode> {
        let start = Instant::now();
        let located = self.membership.ring().locate(key);
        let latency = start.elapsed();

        match located {
            Ok(vnode) => {
                counter!("ring_routes_total", "outcome" => "routed").increment(1);
                histogram!("ring_route_latency_seconds").record(latency.as_secs_f64());
                self.notify(key, vnode.server(), latency);
                Ok(vnode)
            }
            Err(err) => {
                counter!("ring_routes_total", "outcome" => "empty_ring").increment(1);
                Err(err)
            }
        }
    }

    /// Add a server; see [`MembershipManager::add_server`].
    pub fn add_server(&self) -> ServerId {
        self.membership.add_server()
    }

    /// Add a server, reporting id exhaustion as an error.
    pub fn try_add_server(&self) -> Result<ServerId> {
        self.membership.try_add_server()
    }

    /// Remove a server; unknown ids are ignored and return `false`.
    pub fn remove_server(&self, id: ServerId) -> bool {
        self.membership.remove_server(id)
    }

    /// Change virtual nodes per server, rebuilding the whole ring.
    pub fn set_replication_factor(&self, replication_factor: usize) -> Result<()> {
        self.membership.set_replication_factor(replication_factor)
    }

    pub fn replication_factor(&self) -> usize {
        self.membership.replication_factor()
    }

    /// Live server ids in ascending order.
    pub fn servers(&self) -> Vec<ServerId> {
        self.membership.servers()
    }

    /// Point-in-time copy of the ring.
    pub fn snapshot(&self) -> RingSnapshot {
        self.membership.ring().snapshot()
    }

    pub fn membership(&self) -> &MembershipManager {
        &self.membership
    }

    fn notify(&self, key: &str, server: ServerId, latency: Duration) {
        if self.observers.is_empty() {
            return;
        }
        let timestamp = SystemTime::now();
        for observer in &self.observers {
            contain("served", || observer.notify_served(server));
            contain("latency", || observer.notify_latency(latency));
            contain("accessed", || observer.notify_accessed(key));
            contain("request", || {
                observer.notify_request(key, server, latency, timestamp)
            });
        }
    }
}

/// Run one observer callback, swallowing its error or panic.
fn contain<F>(event: &'static str, callback: F)
where
    F: FnOnce() -> ObserverResult,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(event, error = %err, "routing observer failed");
            counter!("ring_observer_failures_total", "event" => event).increment(1);
        }
        Err(_) => {
            warn!(event, "routing observer panicked");
            counter!("ring_observer_failures_total", "event" => event).increment(1);
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("membership", &self.membership)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Builder for [`Router`].
///
/// # Example
///
/// ```rust
/// use corelib::{HashAlgorithm, Router};
///
/// let router = Router::builder()
///     .with_hash_algorithm(HashAlgorithm::Xxh3)
///     .with_replication_factor(100)
///     .build()
///     .unwrap();
/// router.add_server();
/// assert_eq!(router.snapshot().len(), 100);
/// ```
pub struct RouterBuilder {
    hasher: Arc<dyn HashFunction>,
    replication_factor: usize,
    observers: Vec<Arc<dyn RoutingObserver>>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            hasher: Arc::new(Blake3Hash),
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            observers: Vec::new(),
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new()
            .with_hash_algorithm(config.hash)
            .with_replication_factor(config.replication_factor)
    }

    /// Use a custom hash function.
    pub fn with_hash_function(mut self, hasher: Arc<dyn HashFunction>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Use one of the provided hash functions.
    pub fn with_hash_algorithm(self, algorithm: HashAlgorithm) -> Self {
        self.with_hash_function(algorithm.build())
    }

    pub fn with_replication_factor(mut self, replication_factor: usize) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn with_observer(mut self, observer: Arc<dyn RoutingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// # Errors
    /// [`Error::InvalidReplicationFactor`](crate::Error::InvalidReplicationFactor)
    /// if the replication factor is zero.
    pub fn build(self) -> Result<Router> {
        let ring = Arc::new(HashRing::with_hash_function(self.hasher));
        let membership = MembershipManager::with_replication_factor(ring, self.replication_factor)?;
        Ok(Router {
            membership,
            observers: self.observers,
        })
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::observer::ObserverError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        served: AtomicUsize,
        requests: AtomicUsize,
    }

    impl RoutingObserver for Counting {
        fn notify_served(&self, _server: ServerId) -> ObserverResult {
            self.served.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn notify_request(
            &self,
            _key: &str,
            _server: ServerId,
            _latency: Duration,
            _timestamp: SystemTime,
        ) -> ObserverResult {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    impl RoutingObserver for Failing {
        fn notify_served(&self, _server: ServerId) -> ObserverResult {
            Err(ObserverError::new("usage store unavailable"))
        }

        fn notify_accessed(&self, _key: &str) -> ObserverResult {
            panic!("hot key detector crashed");
        }
    }

    #[test]
    fn test_empty_router_fails() {
        let router = Router::new();
        assert_eq!(router.route("key"), Err(Error::EmptyRing));
    }

    #[test]
    fn test_builder_rejects_zero_factor() {
        let err = Router::builder().with_replication_factor(0).build().unwrap_err();
        assert_eq!(err, Error::InvalidReplicationFactor(0));
    }

    #[test]
    fn test_observers_notified_per_route() {
        let counting = Arc::new(Counting::default());
        let router = Router::builder()
            .with_observer(counting.clone())
            .build()
            .unwrap();
        router.add_server();

        for i in 0..10 {
            router.route(&format!("key-{i}")).unwrap();
        }

        assert_eq!(counting.served.load(Ordering::SeqCst), 10);
        assert_eq!(counting.requests.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_observers_not_notified_on_empty_ring() {
        let counting = Arc::new(Counting::default());
        let router = Router::builder()
            .with_observer(counting.clone())
            .build()
            .unwrap();

        assert!(router.route("key").is_err());
        assert_eq!(counting.served.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failing_observer_does_not_affect_routing() {
        let counting = Arc::new(Counting::default());
        let router = Router::builder()
            .with_observer(Arc::new(Failing))
            .with_observer(counting.clone())
            .build()
            .unwrap();
        let id = router.add_server();

        assert_eq!(router.route("user-42"), Ok(id));
        // Observers after the failing one still run.
        assert_eq!(counting.served.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_route_vnode_matches_route() {
        let router = Router::new();
        router.add_server();
        router.add_server();

        let vnode = router.route_vnode("user-7").unwrap();
        assert_eq!(router.route("user-7").unwrap(), vnode.server());
    }
}
