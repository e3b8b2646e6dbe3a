//! Core library for consistent-hash request routing.
//!
//! This crate provides the fundamental abstractions for routing keys to a
//! dynamic pool of servers:
//! - Hash functions mapping keys to ring positions
//! - Servers and their virtual nodes
//! - The hash ring and its lookup law (successor with wraparound)
//! - Membership management (add/remove servers, replication factor)
//! - The router and its observer boundary for routing telemetry

pub mod config;
pub mod error;
pub mod hash;
pub mod membership;
pub mod node;
pub mod observer;
pub mod ring;
pub mod router;
pub mod vnode;

pub use config::RouterConfig;
pub use error::{Error, Result};
pub use hash::{HashAlgorithm, HashFunction};
pub use membership::{MembershipManager, DEFAULT_REPLICATION_FACTOR};
pub use node::{Server, ServerId};
pub use observer::{ObserverError, ObserverResult, RoutingObserver};
pub use ring::{HashRing, Ring, RingSnapshot};
pub use router::{Router, RouterBuilder};
pub use vnode::VirtualNode;
