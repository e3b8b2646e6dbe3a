//! Consistent hash ring implementation.
//!
//! The ring manages virtual-node positions and provides the lookup that
//! finds the virtual node responsible for a key.

#[allow(clippy::module_inception)]
pub mod ring;
pub mod snapshot;

pub use ring::HashRing;
pub use snapshot::RingSnapshot;

/// Alias for the main ring type (used by lib.rs).
pub type Ring = HashRing;
