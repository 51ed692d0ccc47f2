//! Most Recently Used (MRU) Cache Implementation
//!
//! Structurally identical to [`LruCache`](crate::LruCache), a hash map plus
//! one recency list, but with the opposite victim rule: when a new insertion
//! would exceed capacity, the entry at the *front* of the list (the most
//! recently touched one) is evicted before the new entry is linked in.
//!
//! MRU pays off for cyclic access patterns, e.g. repeated scans over a
//! working set one entry larger than the cache: the item touched last is
//! the one that won't be needed for the longest time, so keeping the older
//! residents beats LRU's behavior of churning through the whole cycle.
//!
//! # Thread Safety
//!
//! `MruCache` is **not** thread-safe; wrap it in a `Mutex` for concurrent
//! access.

use crate::config::MruCacheConfig;
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::list::{List, Node};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// A Most Recently Used (MRU) cache with O(1) operations.
///
/// `get` and overwriting `put` promote an entry to the front exactly like
/// LRU; only the eviction victim differs: the front itself.
///
/// # Example
///
/// ```
/// use evict_rs::MruCache;
///
/// let mut cache = MruCache::new(2).unwrap();
/// cache.put(1, "a");
/// cache.put(2, "b");
/// cache.get(&1);        // 1 is now the most recently used
/// cache.put(3, "c");    // evicts 1, not 2
/// assert_eq!(cache.get(&1), None);
/// assert_eq!(cache.get(&2), Some(&"b"));
/// ```
pub struct MruCache<K, V, S = DefaultHashBuilder> {
    config: MruCacheConfig,
    /// Recency order, most recent at the front (the eviction victim).
    list: List<CacheEntry<K, V>>,
    /// Key to list node.
    map: HashMap<K, *mut Node<CacheEntry<K, V>>, S>,
}

// SAFETY: MruCache owns all data and raw pointers point only to nodes owned
// by `list`. Concurrent access is safe when wrapped in proper
// synchronization primitives.
unsafe impl<K: Send, V: Send, S: Send> Send for MruCache<K, V, S> {}

// SAFETY: All mutation requires &mut self; shared references cannot cause
// data races.
unsafe impl<K: Send, V: Send, S: Sync> Sync for MruCache<K, V, S> {}

impl<K: Hash + Eq, V> MruCache<K, V> {
    /// Creates an MRU cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::InvalidCapacity)?;
        Ok(Self::with_config(MruCacheConfig::new(capacity)))
    }

    /// Creates an MRU cache from a configuration.
    pub fn with_config(config: MruCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> MruCache<K, V, S> {
    /// Creates an MRU cache from a configuration and a custom hash builder.
    pub fn with_hasher(config: MruCacheConfig, hasher: S) -> Self {
        let map_capacity = config.capacity().get().next_power_of_two();
        MruCache {
            config,
            list: List::new(),
            map: HashMap::with_capacity_and_hasher(map_capacity, hasher),
        }
    }

    /// Returns the maximum number of entries the cache can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.config.capacity()
    }

    /// Returns the current number of entries in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Retrieves a reference to the value for the given key and promotes the
    /// entry to the front of the recency list.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        // SAFETY: node comes from our map, so it is a live node of `list`
        unsafe {
            self.list.move_to_front(node);
            Some(&(*node).value().value)
        }
    }

    /// Retrieves a mutable reference to the value for the given key and
    /// promotes the entry to the front of the recency list.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        // SAFETY: node comes from our map, so it is a live node of `list`
        unsafe {
            self.list.move_to_front(node);
            Some(&mut (*node).value_mut().value)
        }
    }

    /// Inserts a key-value pair into the cache.
    ///
    /// Overwriting an existing key replaces the value, promotes the entry,
    /// and returns `Some((key, old_value))`. Inserting a new key at
    /// capacity first evicts the current most-recently-used entry and
    /// returns it.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)>
    where
        K: Clone,
    {
        if let Some(&node) = self.map.get(&key) {
            // SAFETY: node comes from our map
            unsafe {
                self.list.move_to_front(node);
                let old = mem::replace(&mut (*node).value_mut().value, value);
                return Some((key, old));
            }
        }

        // The victim is whatever is most recent *before* the new entry
        // arrives, so evict first and insert after.
        let mut evicted = None;
        if self.map.len() >= self.cap().get() {
            if let Some(entry) = self.list.pop_front() {
                self.map.remove(&entry.key);
                evicted = Some((entry.key, entry.value));
            }
        }

        let node = self.list.push_front(CacheEntry::new(key.clone(), value));
        self.map.insert(key, node);
        evicted
    }

    /// Removes a key from the cache, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        // SAFETY: node came out of our map and the map slot is gone, so this
        // is the last reference to it
        let entry = unsafe { self.list.unlink(node) };
        Some(entry.value)
    }

    /// Removes all entries from the cache.
    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }
}

impl<K, V, S> core::fmt::Debug for MruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MruCache")
            .field("capacity", &self.config.capacity())
            .field("len", &self.map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_capacity() {
        assert_eq!(
            MruCache::<u32, u32>::new(0).unwrap_err(),
            CacheError::InvalidCapacity
        );
    }

    #[test]
    fn test_mru_basic_ops() {
        let mut cache = MruCache::new(2).unwrap();
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.get(&2), Some(&"b"));
        cache.get(&2);
        cache.put(3, "c"); // evicts 2, the most recently used
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&3), Some(&"c"));
    }

    #[test]
    fn test_mru_evicts_most_recent_after_get() {
        let mut cache = MruCache::new(2).unwrap();
        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1); // 1 becomes most recent
        let evicted = cache.put(3, "c");
        assert_eq!(evicted, Some((1, "a")));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&"b"));
        assert_eq!(cache.get(&3), Some(&"c"));
    }

    #[test]
    fn test_mru_overwrite_promotes() {
        let mut cache = MruCache::new(2).unwrap();
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.put(2, "b2"), Some((2, "b")));
        // 2 is the most recent, so inserting 3 evicts it
        cache.put(3, "c");
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(&"a"));
    }

    #[test]
    fn test_mru_remove_and_len() {
        let mut cache = MruCache::new(3).unwrap();
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.remove(&1), Some("a"));
        assert_eq!(cache.remove(&1), None);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_mru_capacity_bound() {
        let mut cache = MruCache::new(3).unwrap();
        for i in 0..20 {
            cache.put(i, i);
            assert!(cache.len() <= 3);
        }
        // the two oldest residents are never the victim
        assert_eq!(cache.get(&0), Some(&0));
        assert_eq!(cache.get(&1), Some(&1));
    }
}
