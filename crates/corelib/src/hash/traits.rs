//! Core hash function trait definitions.

/// A hash function maps a string key to a position on the ring.
///
/// Hash functions are stateless and thread-safe, so the ring can hash
/// concurrently from every routing thread without synchronization.
///
/// Implementations must be pure: the same key yields the same position for
/// the whole process lifetime. They should also spread positions roughly
/// uniformly over `u64`, since load balance between virtual nodes depends on
/// it.
pub trait HashFunction: Send + Sync + 'static {
    /// Converts a key into a ring position.
    fn hash(&self, key: &str) -> u64;

    /// Returns the name of this hash function.
    fn name(&self) -> &'static str;
}
