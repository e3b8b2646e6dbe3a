//! End-to-end tests: a router feeding the analytics collaborators.

use std::sync::Arc;

use analytics::{stats, Analytics};
use corelib::{Router, ServerId};

fn router_with(analytics: &Arc<Analytics>, servers: usize, vnodes: usize) -> Router {
    let router = Router::builder()
        .with_replication_factor(vnodes)
        .with_observer(analytics.clone())
        .build()
        .unwrap();
    for _ in 0..servers {
        let id = router.add_server();
        analytics.server_added(id);
    }
    router
}

#[test]
fn test_every_route_is_accounted() {
    let analytics = Arc::new(Analytics::new());
    let router = router_with(&analytics, 4, 3);

    for i in 0..500 {
        router.route(&format!("user-{}", i % 50)).unwrap();
    }

    assert_eq!(analytics.usage.total(), 500);
    assert_eq!(analytics.latency.count(), 500);
    assert_eq!(analytics.history.len(), 500);
    assert_eq!(analytics.hot_keys.distinct_keys(), 50);
    assert_eq!(analytics.hot_keys.count("user-7"), 10);
}

#[test]
fn test_history_matches_routing_decisions() {
    let analytics = Arc::new(Analytics::new());
    let router = router_with(&analytics, 3, 3);

    let keys = ["a", "b", "c", "a"];
    let routed: Vec<ServerId> = keys.iter().map(|k| router.route(k).unwrap()).collect();

    let history = analytics.history.replay();
    let replayed: Vec<(&str, ServerId)> = history.iter().map(|r| (r.key.as_str(), r.server)).collect();
    let expected: Vec<(&str, ServerId)> = keys.iter().copied().zip(routed).collect();
    assert_eq!(replayed, expected);
}

#[test]
fn test_hot_key_surfaces_first() {
    let analytics = Arc::new(Analytics::new());
    let router = router_with(&analytics, 3, 3);

    for i in 1..=1_000 {
        let key = if i % 20 == 0 { "HOT_KEY".to_string() } else { format!("user-{}", i % 300) };
        router.route(&key).unwrap();
    }

    let top = analytics.hot_keys.top(3);
    assert_eq!(top[0], ("HOT_KEY".to_string(), 50));
}

#[test]
fn test_load_spread_with_many_vnodes() {
    let analytics = Arc::new(Analytics::new());
    let router = router_with(&analytics, 10, 100);

    for i in 0..50_000 {
        router.route(&format!("user-{i}")).unwrap();
    }

    let load: Vec<u64> = analytics.usage.load().into_values().collect();
    assert_eq!(load.len(), 10);
    let cv = stats::coefficient_of_variation(&load);
    assert!(cv < 0.3, "load too uneven: cv={cv:.3} load={load:?}");
}

#[test]
fn test_removed_server_no_longer_served() {
    let analytics = Arc::new(Analytics::new());
    let router = router_with(&analytics, 3, 10);

    router.remove_server(ServerId(0));
    analytics.server_removed(ServerId(0));
    analytics.usage.reset();

    for i in 0..1_000 {
        router.route(&format!("post-removal-{i}")).unwrap();
    }
    assert_eq!(analytics.usage.served_by(ServerId(0)), 0);
    assert_eq!(analytics.usage.total(), 1_000);
}

#[test]
fn test_concurrent_routing_counts_exactly() {
    let analytics = Arc::new(Analytics::new());
    let router = router_with(&analytics, 5, 20);

    crossbeam::thread::scope(|s| {
        for t in 0..8 {
            let router = &router;
            s.spawn(move |_| {
                for i in 0..1_000 {
                    router.route(&format!("t{t}-k{i}")).unwrap();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(analytics.usage.total(), 8_000);
    assert_eq!(analytics.latency.count(), 8_000);
    assert_eq!(analytics.history.len(), 8_000);
}

#[test]
fn test_report_serializes() {
    let analytics = Arc::new(Analytics::new());
    let router = router_with(&analytics, 2, 3);
    router.route("user-1").unwrap();

    let report = analytics.report(3);
    assert_eq!(report.requests, 1);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["hot_keys"][0][0], "user-1");
    assert!(report.to_string().starts_with("--- SYSTEM STATS ---"));
}
