//! Least Frequently Used (LFU) Cache Implementation
//!
//! An LFU cache evicts the item with the fewest recorded accesses. Items are
//! bucketed into one intrusive list per frequency, and a running minimum
//! frequency makes the eviction victim reachable in O(1).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              LFU Cache                              │
//! │                                                                     │
//! │  HashMap<K, *Node>              BTreeMap<Frequency, List>           │
//! │  ┌──────────────┐              ┌──────────────────────────────────┐ │
//! │  │ "hot" ──────────────────────│ freq=10: [hot] ◀──▶ [warm]       │ │
//! │  │ "warm" ─────────────────────│ freq=5:  [item_a] ◀──▶ [item_b]  │ │
//! │  │ "cold" ─────────────────────│ freq=1:  [cold] ◀──▶ [new]  ←LFU │ │
//! │  └──────────────┘              └──────────────────────────────────┘ │
//! │                                        ▲                            │
//! │                                   min_frequency=1                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every access detaches the node from its current frequency list and
//! pushes it to the front of the next one, so each list is ordered by
//! promotion recency: the tail of the minimum-frequency list is the least
//! recently promoted among the least frequently used, and that is the
//! eviction victim.
//!
//! Two invariants keep this O(1):
//!
//! - a frequency list is deleted from the bucket map the moment it empties,
//!   so `min_frequency` always indexes a non-empty list while the cache has
//!   entries;
//! - after an access vacates the minimum bucket, the new minimum is exactly
//!   `old + 1` (the promoted node itself lives there), so no scan is
//!   needed.
//!
//! ## Access Pattern Example
//!
//! ```text
//! Cache capacity: 3
//!
//! put("a", 1)  →  freq_1: [a]
//! put("b", 2)  →  freq_1: [b, a]
//! put("c", 3)  →  freq_1: [c, b, a]
//! get("a")     →  freq_1: [c, b], freq_2: [a]
//! get("a")     →  freq_1: [c, b], freq_3: [a]
//! put("d", 4)  →  freq_1: [d, c], freq_3: [a]   // "b" evicted (LFU tie, oldest)
//! ```
//!
//! # Thread Safety
//!
//! `LfuCache` is **not** thread-safe; wrap it in a `Mutex` for concurrent
//! access.

use crate::config::LfuCacheConfig;
use crate::entry::{CacheEntry, LfuMeta};
use crate::error::CacheError;
use crate::list::{List, Node};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
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

/// Type of a node in one of the frequency lists.
type LfuNode<K, V> = Node<CacheEntry<K, V, LfuMeta>>;

/// A Least Frequently Used (LFU) cache with O(1) operations.
///
/// Tracks an access frequency per entry and evicts the least frequently
/// used one; ties are broken by evicting the least recently promoted.
///
/// # Example
///
/// ```
/// use evict_rs::LfuCache;
///
/// let mut cache = LfuCache::new(2).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
///
/// cache.get(&"a"); // frequency 2 vs 1
///
/// cache.put("c", 3); // "b" evicted (lowest frequency)
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"a"), Some(&1));
/// ```
pub struct LfuCache<K, V, S = DefaultHashBuilder> {
    config: LfuCacheConfig,

    /// Current minimum frequency. Meaningless while the cache is empty;
    /// re-established to 1 by the next insertion.
    min_frequency: u64,

    /// Key to list node. The node's metadata records which frequency list
    /// it currently lives in.
    map: HashMap<K, *mut LfuNode<K, V>, S>,

    /// One list per live frequency, most recently promoted at the front.
    /// Never contains an empty list.
    frequency_lists: BTreeMap<u64, List<CacheEntry<K, V, LfuMeta>>>,
}

// SAFETY: LfuCache owns all data and raw pointers point only to nodes owned
// by `frequency_lists`. Concurrent access is safe when wrapped in proper
// synchronization primitives.
unsafe impl<K: Send, V: Send, S: Send> Send for LfuCache<K, V, S> {}

// SAFETY: All mutation requires &mut self; shared references cannot cause
// data races.
unsafe impl<K: Send, V: Send, S: Sync> Sync for LfuCache<K, V, S> {}

impl<K: Hash + Eq, V> LfuCache<K, V> {
    /// Creates an LFU cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::InvalidCapacity)?;
        Ok(Self::with_config(LfuCacheConfig::new(capacity)))
    }

    /// Creates an LFU cache from a configuration.
    pub fn with_config(config: LfuCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LfuCache<K, V, S> {
    /// Creates an LFU cache from a configuration and a custom hash builder.
    pub fn with_hasher(config: LfuCacheConfig, hasher: S) -> Self {
        let map_capacity = config.capacity().get().next_power_of_two();
        LfuCache {
            config,
            min_frequency: 1,
            map: HashMap::with_capacity_and_hasher(map_capacity, hasher),
            frequency_lists: BTreeMap::new(),
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

    /// Records an access: moves `node` from its current frequency list to
    /// the front of the next one and updates `min_frequency`.
    ///
    /// # Safety
    ///
    /// `node` must be a live node tracked by this cache's map.
    unsafe fn promote(&mut self, node: *mut LfuNode<K, V>) {
        // SAFETY: node is live per the caller's contract
        let old_freq = unsafe { (*node).value().meta.frequency };
        let new_freq = old_freq + 1;

        let old_list = self
            .frequency_lists
            .get_mut(&old_freq)
            .expect("entry metadata must match its frequency list");
        // SAFETY: the node lives in the list its metadata names
        unsafe { old_list.detach(node) };
        let vacated = old_list.is_empty();
        if vacated {
            self.frequency_lists.remove(&old_freq);
        }

        // SAFETY: node is detached but still allocated
        unsafe { (*node).value_mut().meta.frequency = new_freq };
        let new_list = self.frequency_lists.entry(new_freq).or_insert_with(List::new);
        // SAFETY: node was detached above and is not linked anywhere
        unsafe { new_list.attach_front(node) };

        // The promoted node itself now sits at old_freq + 1, so the minimum
        // never has to be searched for.
        if vacated && old_freq == self.min_frequency {
            self.min_frequency = new_freq;
        }
    }

    /// Retrieves a reference to the value for the given key.
    ///
    /// A hit counts as an access and increments the entry's frequency.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        // SAFETY: node comes from our map
        unsafe {
            self.promote(node);
            Some(&(*node).value().value)
        }
    }

    /// Retrieves a mutable reference to the value for the given key.
    ///
    /// A hit counts as an access and increments the entry's frequency.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        // SAFETY: node comes from our map
        unsafe {
            self.promote(node);
            Some(&mut (*node).value_mut().value)
        }
    }

    /// Inserts a key-value pair into the cache.
    ///
    /// Overwriting an existing key replaces the value, counts as an access
    /// (frequency bump), and returns `Some((key, old_value))`. A new key is
    /// inserted at frequency 1; if the cache is full, the tail of the
    /// minimum-frequency list is evicted first and returned.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)>
    where
        K: Clone,
    {
        if let Some(&node) = self.map.get(&key) {
            // SAFETY: node comes from our map
            unsafe {
                let old = mem::replace(&mut (*node).value_mut().value, value);
                self.promote(node);
                return Some((key, old));
            }
        }

        let mut evicted = None;
        if self.map.len() >= self.cap().get() {
            evicted = self.evict();
        }

        let list = self.frequency_lists.entry(1).or_insert_with(List::new);
        let node = list.push_front(CacheEntry::with_meta(key.clone(), value, LfuMeta::new(1)));
        self.map.insert(key, node);
        self.min_frequency = 1;
        evicted
    }

    /// Evicts the least frequently used entry (least recently promoted
    /// among ties) and returns it.
    fn evict(&mut self) -> Option<(K, V)> {
        let list = self.frequency_lists.get_mut(&self.min_frequency)?;
        let entry = list.pop_back()?;
        if list.is_empty() {
            self.frequency_lists.remove(&self.min_frequency);
        }
        self.map.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Removes a key from the cache, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        // SAFETY: node came out of our map; its metadata names its list
        let entry = unsafe {
            let freq = (*node).value().meta.frequency;
            let list = self
                .frequency_lists
                .get_mut(&freq)
                .expect("entry metadata must match its frequency list");
            let entry = list.unlink(node);
            if list.is_empty() {
                self.frequency_lists.remove(&freq);
                if freq == self.min_frequency {
                    // Smallest surviving frequency; 1 is as good as any
                    // placeholder when the cache just emptied.
                    self.min_frequency =
                        self.frequency_lists.keys().next().copied().unwrap_or(1);
                }
            }
            entry
        };
        Some(entry.value)
    }

    /// Returns a snapshot of `(key, frequency)` pairs for every entry, in
    /// unspecified order.
    pub fn items(&self) -> Vec<(K, u64)>
    where
        K: Clone,
    {
        self.map
            .iter()
            .map(|(key, &node)| {
                // SAFETY: node comes from our map
                let frequency = unsafe { (*node).value().meta.frequency };
                (key.clone(), frequency)
            })
            .collect()
    }

    /// Removes all entries from the cache.
    pub fn clear(&mut self) {
        self.map.clear();
        self.frequency_lists.clear();
        self.min_frequency = 1;
    }
}

impl<K, V, S> core::fmt::Debug for LfuCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LfuCache")
            .field("capacity", &self.config.capacity())
            .field("len", &self.map.len())
            .field("min_frequency", &self.min_frequency)
            .finish()
    }
}
