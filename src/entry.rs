//! Unified Cache Entry Type
//!
//! This module provides a unified `CacheEntry<K, V, M>` structure shared by
//! the list-backed cache implementations. The generic `M` parameter lets
//! each algorithm store its own metadata without affecting the core entry
//! structure: LRU and MRU use `()` (their position in the recency list is
//! the only state they need), LFU stores an access counter via [`LfuMeta`].
//!
//! The TTL cache keeps its own entry type next to the timing wheel, since its
//! per-entry state (absolute expiry, wheel slot) is tied to the wheel's
//! geometry rather than to a policy counter.

use core::fmt;

/// A cache entry holding a key, a value, and algorithm-specific metadata.
///
/// Entries live inside intrusive list nodes; the owning cache's hash map
/// holds a raw pointer to the node. The key is stored both here and in the
/// map: the copy here is what lets an eviction taken from a list tail find
/// and remove its own map slot.
pub struct CacheEntry<K, V, M = ()> {
    /// The cached key.
    pub key: K,

    /// The cached value.
    pub value: V,

    /// Algorithm-specific metadata. `()` for policies that don't need
    /// per-entry state beyond list position.
    pub meta: M,
}

impl<K, V> CacheEntry<K, V> {
    /// Creates an entry without algorithm-specific metadata.
    #[inline]
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            meta: (),
        }
    }
}

impl<K, V, M> CacheEntry<K, V, M> {
    /// Creates an entry with algorithm-specific metadata.
    #[inline]
    pub fn with_meta(key: K, value: V, meta: M) -> Self {
        Self { key, value, meta }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, M: fmt::Debug> fmt::Debug for CacheEntry<K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("meta", &self.meta)
            .finish()
    }
}

/// Metadata for LFU (Least Frequently Used) cache entries.
///
/// The frequency counter starts at 1 on insertion and is incremented on
/// every access (`get` or `put` of an existing key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LfuMeta {
    /// Access frequency count.
    pub frequency: u64,
}

impl LfuMeta {
    /// Creates LFU metadata with the given initial frequency.
    #[inline]
    pub fn new(frequency: u64) -> Self {
        Self { frequency }
    }
}

impl Default for LfuMeta {
    /// New entries start with one recorded access: the insertion itself.
    fn default() -> Self {
        Self { frequency: 1 }
    }
}
