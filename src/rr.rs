//! Random Replacement (RR) Cache Implementation
//!
//! The cheapest eviction policy of the family: no ordering structure at all.
//! A hash map holds the entries and a parallel, unordered key vector exists
//! solely so a uniformly random victim can be picked in O(1).
//!
//! Eviction is biased toward dead weight: up to five random probes look for
//! an entry whose TTL (set via [`RrCache::put_with_ttl`]) has already
//! elapsed, and only if none is found does a final probe evict
//! unconditionally. Plain [`RrCache::put`] stores entries that never
//! expire, so with a TTL-free workload the probes simply fall through to
//! the unconditional pick.
//!
//! The key vector is repaired with swap-remove on every removal path,
//! keeping `vector length == map length` without ever shifting elements.
//!
//! # Thread Safety
//!
//! All public operations take `&self` behind a single internal
//! [`parking_lot::Mutex`] covering both the map and the key vector, so
//! `RrCache` can be shared across threads as-is.

use crate::config::RrCacheConfig;
use crate::error::CacheError;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use std::vec::Vec;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// How many random probes look for an already-expired victim before one
/// more probe evicts unconditionally.
const EXPIRED_PROBES: usize = 5;

/// A stored value with its optional expiry instant.
struct RrEntry<V> {
    value: V,
    /// `None` means the entry never expires.
    expire_at: Option<Instant>,
}

impl<V> RrEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expire_at, Some(at) if now > at)
    }
}

/// Map, key vector, and RNG, guarded together by the cache mutex.
struct RrState<K, V, S> {
    data: HashMap<K, RrEntry<V>, S>,
    /// Unordered; exists only for uniform random sampling. Always the same
    /// length as `data`, with every key appearing exactly once.
    keys: Vec<K>,
    rng: SmallRng,
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> RrState<K, V, S> {
    /// Repairs the key vector after `key` left the map: linear scan,
    /// swap with the last element, truncate by one.
    fn forget_key<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        if let Some(pos) = self.keys.iter().position(|k| k.borrow() == key) {
            self.keys.swap_remove(pos);
        }
    }

    /// Frees one slot. Probes up to [`EXPIRED_PROBES`] random indices and
    /// evicts the first expired entry found; otherwise one more random
    /// index is evicted unconditionally.
    fn evict_random(&mut self, now: Instant) {
        if self.keys.is_empty() {
            return;
        }
        for _ in 0..EXPIRED_PROBES {
            let idx = self.rng.random_range(0..self.keys.len());
            if self.data[&self.keys[idx]].is_expired(now) {
                let key = self.keys.swap_remove(idx);
                self.data.remove(&key);
                return;
            }
        }
        let idx = self.rng.random_range(0..self.keys.len());
        let key = self.keys.swap_remove(idx);
        self.data.remove(&key);
    }

    /// Shared tail of `put`/`put_with_ttl`.
    fn insert(&mut self, key: K, value: V, expire_at: Option<Instant>, capacity: usize) {
        if let Some(entry) = self.data.get_mut(&key) {
            entry.value = value;
            if let Some(at) = expire_at {
                entry.expire_at = Some(at);
            }
            return;
        }
        if self.data.len() >= capacity {
            self.evict_random(Instant::now());
        }
        self.data.insert(key.clone(), RrEntry { value, expire_at });
        self.keys.push(key);
    }
}

/// A Random Replacement cache with an internal mutex.
///
/// # Example
///
/// ```
/// use evict_rs::RrCache;
/// use std::time::Duration;
///
/// let cache = RrCache::new(2).unwrap();
/// cache.put("a", 1);
/// cache.put_with_ttl("b", 2, Duration::from_secs(60));
/// cache.put("c", 3); // one of "a"/"b" evicted at random
/// assert_eq!(cache.len(), 2);
/// ```
pub struct RrCache<K, V, S = DefaultHashBuilder> {
    config: RrCacheConfig,
    state: Mutex<RrState<K, V, S>>,
}

impl<K: Hash + Eq + Clone, V: Clone> RrCache<K, V> {
    /// Creates an RR cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::InvalidCapacity)?;
        Ok(Self::with_config(RrCacheConfig::new(capacity)))
    }

    /// Creates an RR cache from a configuration.
    pub fn with_config(config: RrCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> RrCache<K, V, S> {
    /// Creates an RR cache from a configuration and a custom hash builder.
    pub fn with_hasher(config: RrCacheConfig, hasher: S) -> Self {
        let map_capacity = config.capacity().get().next_power_of_two();
        RrCache {
            config,
            state: Mutex::new(RrState {
                data: HashMap::with_capacity_and_hasher(map_capacity, hasher),
                keys: Vec::with_capacity(config.capacity().get()),
                rng: SmallRng::from_os_rng(),
            }),
        }
    }

    /// Returns the maximum number of entries the cache can hold.
    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.config.capacity()
    }

    /// Returns the current number of entries, counting entries that have
    /// expired but not yet been evicted.
    pub fn len(&self) -> usize {
        self.state.lock().data.len()
    }

    /// Returns `true` if the cache contains no entries.
    pub fn is_empty(&self) -> bool {
        self.state.lock().data.is_empty()
    }

    /// Retrieves a clone of the value for the given key.
    ///
    /// An entry whose TTL has elapsed counts as a miss and is removed on
    /// the spot.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut state = self.state.lock();
        let entry = state.data.get(key)?;
        if !entry.is_expired(Instant::now()) {
            return Some(entry.value.clone());
        }
        state.data.remove(key);
        state.forget_key(key);
        None
    }

    /// Inserts a key-value pair that never expires.
    ///
    /// Overwriting an existing key replaces the value and leaves any
    /// previously recorded expiry untouched. Inserting a new key at
    /// capacity evicts a random entry first.
    pub fn put(&self, key: K, value: V) {
        self.state
            .lock()
            .insert(key, value, None, self.config.capacity().get());
    }

    /// Inserts a key-value pair that expires `ttl` from now.
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.state.lock().insert(
            key,
            value,
            Some(Instant::now() + ttl),
            self.config.capacity().get(),
        );
    }

    /// Removes a key from the cache, returning its value if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut state = self.state.lock();
        let entry = state.data.remove(key)?;
        state.forget_key(key);
        Some(entry.value)
    }

    /// Removes all entries from the cache.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.data.clear();
        state.keys.clear();
    }
}

impl<K, V, S> fmt::Debug for RrCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RrCache")
            .field("capacity", &self.config.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_invalid_capacity() {
        assert_eq!(
            RrCache::<u32, u32>::new(0).unwrap_err(),
            CacheError::InvalidCapacity
        );
    }

    #[test]
    fn test_rr_basic_ops() {
        let cache = RrCache::new(3).unwrap();
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.get(&3), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity().get(), 3);
    }

    #[test]
    fn test_rr_overwrite_keeps_vector_len() {
        let cache = RrCache::new(3).unwrap();
        cache.put(1, "a");
        cache.put(1, "a2");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.state.lock().keys.len(), 1);
        assert_eq!(cache.get(&1), Some("a2"));
    }

    #[test]
    fn test_rr_never_exceeds_capacity() {
        let cache = RrCache::new(5).unwrap();
        for i in 0..50 {
            cache.put(i, i);
            let state = cache.state.lock();
            assert!(state.data.len() <= 5);
            assert_eq!(state.keys.len(), state.data.len());
        }
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_rr_eviction_prefers_expired() {
        let cache = RrCache::new(4).unwrap();
        cache.put_with_ttl(1, "dead", Duration::from_millis(1));
        cache.put(2, "alive");
        cache.put(3, "alive");
        cache.put(4, "alive");
        thread::sleep(Duration::from_millis(10));

        // The expired entry is very likely the victim, but the final
        // unconditional probe keeps the bound either way.
        cache.put(5, "new");
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_rr_get_drops_expired() {
        let cache = RrCache::new(3).unwrap();
        cache.put_with_ttl(1, "a", Duration::from_millis(1));
        thread::sleep(Duration::from_millis(10));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.state.lock().keys.len(), 0);
    }

    #[test]
    fn test_rr_remove_and_clear() {
        let cache = RrCache::new(3).unwrap();
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.remove(&1), Some("a"));
        assert_eq!(cache.remove(&1), None);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.state.lock().keys.len(), 0);
    }

    #[test]
    fn test_rr_put_overwrite_keeps_ttl() {
        let cache = RrCache::new(3).unwrap();
        cache.put_with_ttl(1, "a", Duration::from_millis(20));
        cache.put(1, "a2"); // plain put does not clear the recorded expiry
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_rr_shared_across_threads() {
        use std::sync::Arc;
        use std::vec::Vec;

        let cache = Arc::new(RrCache::new(50).unwrap());
        let mut handles: Vec<thread::JoinHandle<()>> = Vec::new();
        for t in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..500 {
                    let key = (t * 1000 + i) % 120;
                    cache.put(key, i);
                    let _ = cache.get(&key);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 50);
    }
}
