#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Crate layout
//!
//! - [`lru`]: Least Recently Used cache
//! - [`mru`]: Most Recently Used cache
//! - [`lfu`]: Least Frequently Used cache with per-frequency lists
//! - [`rr`]: Random Replacement cache with expiry-biased eviction probes
//! - [`ttl`]: TTL cache driven by a hierarchical timing wheel
//! - [`config`]: configuration structures for the bounded caches
//! - [`entry`]: the unified cache entry type and policy metadata
//! - [`error`]: the construction-time error type
//!
//! # Choosing an engine
//!
//! | Access pattern | Engine |
//! |---|---|
//! | recent items stay hot | [`LruCache`] |
//! | cyclic scans where the newest item is the coldest | [`MruCache`] |
//! | stable popularity, frequency matters more than recency | [`LfuCache`] |
//! | no useful signal, cheapest possible bookkeeping | [`RrCache`] |
//! | entries have a lifetime rather than a popularity | [`TtlCache`] |

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

/// Unified cache entry type and per-policy metadata.
///
/// Provides the generic `CacheEntry<K, V, M>` structure that holds key,
/// value, and algorithm-specific metadata, plus the metadata types
/// themselves (currently [`LfuMeta`]).
pub mod entry;

/// Doubly linked list implementation with in-place editing capabilities.
///
/// This module is internal infrastructure: it exposes unsafe raw pointer
/// operations that require careful invariant maintenance. Use the high-level
/// cache implementations instead.
pub(crate) mod list;

/// Cache configuration structures.
///
/// Provides configuration structures for the bounded cache implementations.
pub mod config;

/// Construction-time errors.
pub mod error;

/// Least Recently Used (LRU) cache implementation.
///
/// Provides a fixed-size cache that evicts the least recently used items when
/// the capacity is reached.
pub mod lru;

/// Most Recently Used (MRU) cache implementation.
///
/// Provides a fixed-size cache that evicts the *most* recently used item to
/// make room for a new one. Useful for cyclic access patterns where the item
/// touched last is the least likely to be needed next.
pub mod mru;

/// Least Frequently Used (LFU) cache implementation.
///
/// Provides a fixed-size cache that evicts the least frequently used items
/// when capacity is reached. Items are tracked by their access frequency.
pub mod lfu;

/// Random Replacement (RR) cache implementation.
///
/// Provides a fixed-size, internally synchronized cache that evicts a
/// uniformly random entry, preferring entries whose TTL has already elapsed.
///
/// Available when the `std` feature is enabled.
#[cfg(feature = "std")]
pub mod rr;

/// Hierarchical timing wheel used by the TTL cache.
#[cfg(feature = "std")]
pub(crate) mod wheel;

/// TTL cache implementation.
///
/// Provides an unbounded, internally synchronized cache whose entries expire
/// after a per-entry time to live. Expiration is amortized across a ~1 ms
/// background tick over a three-level timing wheel instead of per-entry
/// timers.
///
/// Available when the `std` feature is enabled.
#[cfg(feature = "std")]
pub mod ttl;

// Re-export cache types
pub use lfu::LfuCache;
pub use lru::LruCache;
pub use mru::MruCache;
#[cfg(feature = "std")]
pub use rr::RrCache;
#[cfg(feature = "std")]
pub use ttl::TtlCache;

// Re-export entry and error types
pub use entry::{CacheEntry, LfuMeta};
pub use error::CacheError;
