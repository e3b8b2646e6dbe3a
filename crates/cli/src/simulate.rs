//! Request-routing simulation.
//!
//! Adds servers, pushes a synthetic key stream (uniform keys plus one hot
//! key) through the router from several worker threads, prints statistics,
//! then removes server 0 and measures how many keys moved.

use std::sync::Arc;
use std::time::Instant;

use analytics::Analytics;
use anyhow::Context;
use clap::Args;
use corelib::{Router, RouterConfig, RingSnapshot, ServerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::visualize;

/// Per-request lines and the ring dump are printed up to this many requests.
const MAX_VERBOSE_REQUESTS: u64 = 100;

const HOT_KEY: &str = "HOT_KEY";

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Servers to start with.
    #[arg(long, default_value_t = 10)]
    pub servers: usize,

    /// Requests to route.
    #[arg(long, default_value_t = 100_000)]
    pub requests: u64,

    /// Every n-th request targets the hot key.
    #[arg(long, default_value_t = 20)]
    pub hot_key_ratio: u64,

    /// Distinct regular keys (`user-0` .. `user-{n-1}`).
    #[arg(long, default_value_t = 1_000)]
    pub key_space: u32,

    /// Routing threads.
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Hot keys to report.
    #[arg(long, default_value_t = 3)]
    pub top_keys: usize,

    /// Request records kept for replay; 0 disables the history.
    #[arg(long, default_value_t = 10_000)]
    pub history_limit: usize,

    /// Seed for key generation; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print reports as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print the retained request history after the run.
    #[arg(long)]
    pub replay: bool,
}

pub fn run(config: &RouterConfig, args: &SimulateArgs) -> anyhow::Result<()> {
    let verbose = args.requests <= MAX_VERBOSE_REQUESTS;
    let analytics = Arc::new(Analytics::with_history_limit(args.history_limit));
    let router = Router::builder()
        .with_hash_algorithm(config.hash)
        .with_replication_factor(config.replication_factor)
        .with_observer(analytics.clone())
        .build()
        .context("building router")?;

    banner("CONSISTENT HASHING SIMULATION");

    step("Adding Servers");
    for _ in 0..args.servers {
        let id = router.add_server();
        analytics.server_added(id);
    }
    info!(
        servers = args.servers,
        vnodes = config.replication_factor,
        hash = %config.hash,
        "servers added"
    );
    if verbose {
        print!("{}", visualize::render_ring(&router.snapshot()));
    }

    step("Routing Requests");
    let started = Instant::now();
    route_requests(&router, args, verbose)?;
    info!(
        requests = args.requests,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "routing finished"
    );

    step("Final Stats");
    print_report(&analytics, args)?;

    step("Removing Server 0 & Re-testing");
    let sample: Vec<String> = (0..args.key_space).map(|i| format!("user-{i}")).collect();
    let before = owners(&router, &router.snapshot(), &sample);
    if router.remove_server(ServerId(0)) {
        analytics.server_removed(ServerId(0));
    }
    let after = owners(&router, &router.snapshot(), &sample);

    for i in 0..args.requests / 10 {
        router.route(&format!("post-removal-{i}"))?;
    }
    print_report(&analytics, args)?;

    let moved = before.iter().zip(&after).filter(|(b, a)| b != a).count();
    println!(
        "Keys remapped: {moved}/{} ({:.2}%)",
        sample.len(),
        100.0 * moved as f64 / sample.len().max(1) as f64
    );

    if args.replay {
        step("Request Replay");
        for record in analytics.history.replay() {
            println!("{record}");
        }
    }

    banner("SIMULATION COMPLETE");
    Ok(())
}

/// Route `args.requests` keys, split across worker threads. Verbose runs use
/// a single worker so the per-request lines stay in order.
fn route_requests(router: &Router, args: &SimulateArgs, verbose: bool) -> anyhow::Result<()> {
    let workers = if verbose { 1 } else { args.workers.max(1) as u64 };
    let seed = args.seed.unwrap_or_else(rand::random);

    let results = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                s.spawn(move |_| route_worker(router, args, verbose, seed, worker, workers))
            })
            .collect();
        handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
    })
    .map_err(|_| anyhow::anyhow!("routing scope panicked"))?;

    for result in results {
        result.map_err(|_| anyhow::anyhow!("routing worker panicked"))??;
    }
    Ok(())
}

/// Worker `worker` of `workers` handles request indices `worker + 1`,
/// `worker + 1 + workers`, ...
fn route_worker(
    router: &Router,
    args: &SimulateArgs,
    verbose: bool,
    seed: u64,
    worker: u64,
    workers: u64,
) -> corelib::Result<()> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker));
    let mut i = worker + 1;
    while i <= args.requests {
        let key = if args.hot_key_ratio > 0 && i % args.hot_key_ratio == 0 {
            HOT_KEY.to_string()
        } else {
            format!("user-{}", rng.gen_range(0..args.key_space.max(1)))
        };

        let start = Instant::now();
        let vnode = router.route_vnode(&key)?;
        let latency = start.elapsed();

        if verbose {
            println!(
                "REQ-{i:05} | key={key:<10} | server={:<3} | vnode={:<8} | latency={:6.3} ms",
                vnode.server().to_string(),
                vnode.label(),
                latency.as_secs_f64() * 1_000.0
            );
        }
        i += workers;
    }
    Ok(())
}

/// Owner of each key on a frozen ring, without emitting routing telemetry.
fn owners(router: &Router, snapshot: &RingSnapshot, keys: &[String]) -> Vec<Option<ServerId>> {
    let ring = router.membership().ring();
    keys.iter()
        .map(|k| snapshot.successor(ring.position_of(k)).map(|v| v.server()))
        .collect()
}

fn print_report(analytics: &Analytics, args: &SimulateArgs) -> anyhow::Result<()> {
    let report = analytics.report(args.top_keys);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn step(title: &str) {
    println!("\n--------------------------------------------------");
    println!("STEP -> {title}");
    println!("--------------------------------------------------");
}

fn banner(title: &str) {
    println!("\n==================================================");
    println!(" {title}");
    println!("==================================================");
}
