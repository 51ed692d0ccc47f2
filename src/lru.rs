//! Least Recently Used (LRU) Cache Implementation
//!
//! An LRU cache evicts the least recently accessed item when capacity is
//! reached. A hash map provides O(1) key lookup and stores pointers into a
//! doubly-linked list that maintains access order, so every operation is
//! O(1).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        LRU Cache                                │
//! │                                                                 │
//! │  HashMap<K, *Node>          Doubly-Linked List                  │
//! │  ┌──────────────┐          ┌──────────────────────────────┐     │
//! │  │ "apple" ──────────────▶ │ MRU ◀──▶ ... ◀──▶ LRU        │     │
//! │  │ "banana" ─────────────▶ │  ▲                    │      │     │
//! │  │ "cherry" ─────────────▶ │  │                    ▼      │     │
//! │  └──────────────┘          │ head              tail       │     │
//! │                            └──────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Eviction Example
//!
//! ```text
//! Cache capacity: 3
//!
//! put("a", 1)  →  [a]
//! put("b", 2)  →  [b, a]
//! put("c", 3)  →  [c, b, a]
//! get("a")     →  [a, c, b]       // "a" moved to front (MRU)
//! put("d", 4)  →  [d, a, c]       // "b" evicted (was LRU)
//! ```
//!
//! # Thread Safety
//!
//! `LruCache` is **not** thread-safe; every state-touching operation takes
//! `&mut self` (even `get` relinks a node). Wrap it in a `Mutex` for
//! concurrent access.

use crate::config::LruCacheConfig;
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

/// A Least Recently Used (LRU) cache with O(1) operations.
///
/// Maintains items in order of access recency. When capacity is reached,
/// the least recently accessed item is evicted to make room for new entries.
///
/// # Example
///
/// ```
/// use evict_rs::LruCache;
///
/// let mut cache = LruCache::new(2).unwrap();
///
/// cache.put("apple", 1);
/// cache.put("banana", 2);
/// assert_eq!(cache.get(&"apple"), Some(&1));
///
/// // "banana" is now LRU, so it gets evicted
/// cache.put("cherry", 3);
/// assert_eq!(cache.get(&"banana"), None);
/// ```
pub struct LruCache<K, V, S = DefaultHashBuilder> {
    config: LruCacheConfig,
    /// Recency order, most recent at the front.
    list: List<CacheEntry<K, V>>,
    /// Key to list node. Holds the sole strong reference to each entry;
    /// the list links are non-owning siblings.
    map: HashMap<K, *mut Node<CacheEntry<K, V>>, S>,
}

// SAFETY: LruCache owns all data and raw pointers point only to nodes owned
// by `list`. Concurrent access is safe when wrapped in proper
// synchronization primitives.
unsafe impl<K: Send, V: Send, S: Send> Send for LruCache<K, V, S> {}

// SAFETY: All mutation requires &mut self; shared references cannot cause
// data races.
unsafe impl<K: Send, V: Send, S: Sync> Sync for LruCache<K, V, S> {}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Creates an LRU cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::InvalidCapacity)?;
        Ok(Self::with_config(LruCacheConfig::new(capacity)))
    }

    /// Creates an LRU cache from a configuration.
    pub fn with_config(config: LruCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruCache<K, V, S> {
    /// Creates an LRU cache from a configuration and a custom hash builder.
    pub fn with_hasher(config: LruCacheConfig, hasher: S) -> Self {
        let map_capacity = config.capacity().get().next_power_of_two();
        LruCache {
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
    /// entry to the most-recently-used position.
    ///
    /// Returns `None` if the key is not present.
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
    /// promotes the entry to the most-recently-used position.
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
    /// If the key already exists the value is replaced, the entry moves to
    /// the most-recently-used position, and `Some((key, old_value))` is
    /// returned. If the insertion pushes the cache over capacity the least
    /// recently used entry is evicted and returned.
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

        let node = self.list.push_front(CacheEntry::new(key.clone(), value));
        self.map.insert(key, node);

        if self.map.len() > self.cap().get() {
            if let Some(entry) = self.list.pop_back() {
                self.map.remove(&entry.key);
                return Some((entry.key, entry.value));
            }
        }
        None
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

impl<K, V, S> core::fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.config.capacity())
            .field("len", &self.map.len())
            .finish()
    }
}
