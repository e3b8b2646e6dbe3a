//! Text rendering of the ring.

use std::fmt::Write;

use corelib::RingSnapshot;

/// One line per entry, in position order: `position -> label (Server id)`.
pub fn render_ring(snapshot: &RingSnapshot) -> String {
    let mut out = String::from("--- HASH RING ---\n");
    for (position, vnode) in snapshot.iter() {
        let _ = writeln!(out, "{position:>20} -> {vnode}");
    }
    out
}

/// Share of the ring's circumference and virtual-node count per server.
pub fn render_ownership(snapshot: &RingSnapshot) -> String {
    let mut out = String::from("--- OWNERSHIP ---\n");
    for (server, share) in snapshot.ownership() {
        let _ = writeln!(
            out,
            "Server {server}: {:>6.2}% ({} vnodes)",
            share * 100.0,
            snapshot.entries_for(server)
        );
    }
    out
}
