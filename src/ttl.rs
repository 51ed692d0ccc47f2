//! TTL (Time To Live) Cache Implementation
//!
//! An unbounded cache whose entries expire after a per-entry TTL. Instead
//! of one timer per entry, expiration is amortized over a
//! [hierarchical timing wheel](crate::wheel): a background thread advances
//! a global tick every ~1 ms, sweeping at most one wheel slot per tick.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                           TTL Cache                               │
//! │                                                                   │
//! │  RwLock ┌───────────────────────────────────────────────────┐     │
//! │         │ HashMap<K, *Node>      3-level timing wheel       │     │
//! │         │ ┌──────────┐          ┌─────────────────────────┐ │     │
//! │         │ │ "s1" ───────────────▶ w0: 512 × 1 ms slots    │ │     │
//! │         │ │ "s2" ───────────────▶ w1: 256 × 512 ms slots  │ │     │
//! │         │ └──────────┘          │ w2: 256 × 131 s slots   │ │     │
//! │         └──────────────────────└─────────────────────────┘─┘     │
//! │                  ▲ write lock: set / remove / tick                │
//! │                  │ read lock:  get                                │
//! │         [ticker thread, ~1 ms] ──▶ advance, sweep, cascade        │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Expiration is "at or after" the declared TTL, never before: `get`
//! checks the exact expiry instant, while the wheel's slot resolution only
//! bounds how long a dead entry can linger before cleanup (one level-0
//! revolution, ~512 ms, for sub-second TTLs).
//!
//! # Thread Safety
//!
//! All operations take `&self`. `get` holds the read lock; `set`,
//! `remove`, and the background tick hold the write lock. The cache can be
//! shared across threads as-is.
//!
//! # Lifecycle
//!
//! [`TtlCache::stop`] terminates the background tick and is idempotent.
//! After `stop`, `get` and `set` remain safe, but the wheel no longer
//! advances, so expired entries linger until overwritten or removed.
//! Dropping the cache stops and joins the ticker.

use crate::wheel::{TtlNode, Wheel};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use log::debug;
use parking_lot::{Mutex, RwLock};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// How often the background thread advances the wheel.
const TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Map and wheel, guarded together by the cache's readers-writer lock.
struct TtlState<K, V, S> {
    /// Key to wheel node. Holds the only strong reference to each entry.
    map: HashMap<K, *mut TtlNode<K, V>, S>,
    wheel: Wheel<K, V>,
}

// SAFETY: TtlState owns all data and raw pointers point only to nodes owned
// by `wheel`. Moving the state between threads moves that ownership whole.
unsafe impl<K: Send, V: Send, S: Send> Send for TtlState<K, V, S> {}

// SAFETY: shared access only reads (the RwLock hands out &TtlState to
// concurrent readers, which dereference nodes immutably); all mutation goes
// through the write lock and therefore &mut.
unsafe impl<K: Send + Sync, V: Send + Sync, S: Sync> Sync for TtlState<K, V, S> {}

/// A TTL cache expiring entries via a three-level timing wheel.
///
/// # Example
///
/// ```
/// use evict_rs::TtlCache;
/// use std::time::Duration;
///
/// let cache: TtlCache<&str, u32> = TtlCache::new();
/// cache.set("token", 42, Duration::from_secs(30));
/// assert_eq!(cache.get(&"token"), Some(42));
/// cache.stop();
/// ```
pub struct TtlCache<K, V, S = DefaultHashBuilder> {
    state: Arc<RwLock<TtlState<K, V, S>>>,
    /// Dropping the sender disconnects the ticker; `Option` + `take` makes
    /// `stop` idempotent.
    stop_tx: Mutex<Option<mpsc::Sender<()>>>,
    ticker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Creates a TTL cache and spawns its background tick thread.
    ///
    /// There is no capacity bound; entries leave by expiring, by being
    /// overwritten, or by [`TtlCache::remove`].
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> TtlCache<K, V, S>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
    S: BuildHasher + Send + Sync + 'static,
{
    /// Creates a TTL cache with a custom hash builder and spawns its
    /// background tick thread.
    pub fn with_hasher(hasher: S) -> Self {
        let state = Arc::new(RwLock::new(TtlState {
            map: HashMap::with_hasher(hasher),
            wheel: Wheel::new(),
        }));
        let (stop_tx, stop_rx) = mpsc::channel();
        let weak = Arc::downgrade(&state);
        let handle = thread::Builder::new()
            .name("evict-ttl-tick".into())
            .spawn(move || Self::run_ticker(&weak, &stop_rx))
            .expect("failed to spawn ttl tick thread");

        TtlCache {
            state,
            stop_tx: Mutex::new(Some(stop_tx)),
            ticker: Mutex::new(Some(handle)),
        }
    }

    /// The background loop: wait one tick interval or a stop signal, then
    /// advance the wheel under the write lock. Holding only a `Weak` lets
    /// the thread wind down on its own if the cache is dropped without
    /// `stop` ever being called.
    fn run_ticker(state: &Weak<RwLock<TtlState<K, V, S>>>, stop_rx: &mpsc::Receiver<()>) {
        debug!("ttl tick thread started");
        loop {
            match stop_rx.recv_timeout(TICK_INTERVAL) {
                // a message is never sent; disconnection is the stop signal
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
            let Some(state) = state.upgrade() else { break };
            let mut guard = state.write();
            let now = Instant::now();
            let TtlState { map, wheel } = &mut *guard;
            wheel.advance(now, |key| {
                map.remove(&key);
            });
        }
        debug!("ttl tick thread stopped");
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> TtlCache<K, V, S> {
    /// Inserts a key-value pair expiring `ttl` from now.
    ///
    /// Replaces (and unlinks) any existing entry with the same key, whether
    /// or not that entry had already expired. TTLs beyond the wheel's
    /// ~9.5 h maximum are clamped to it.
    pub fn set(&self, key: K, value: V, ttl: Duration)
    where
        K: Clone,
    {
        let mut guard = self.state.write();
        let now = Instant::now();
        if let Some(node) = guard.map.remove(&key) {
            // SAFETY: the map only holds nodes linked in the wheel; the map
            // slot is gone, so this was the last outside reference
            drop(unsafe { guard.wheel.unlink(node) });
        }
        let node = guard.wheel.insert(key.clone(), value, ttl, now);
        guard.map.insert(key, node);
    }

    /// Retrieves a clone of the value for the given key.
    ///
    /// An entry past its expiry is a miss even before the wheel collects
    /// it; `get` itself never unlinks anything (cleanup is the tick's job)
    /// and does not re-arm the TTL.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let guard = self.state.read();
        let node = guard.map.get(key).copied()?;
        // SAFETY: node is live while the read lock pins the wheel, and
        // readers only dereference immutably
        let entry = unsafe { (*node).value() };
        if Instant::now() > entry.expires_at {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Removes a key, returning its value if an entry was present, even
    /// one that had expired but not yet been collected.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut guard = self.state.write();
        let node = guard.map.remove(key)?;
        // SAFETY: the map slot is gone, so this was the last outside
        // reference to the node
        let entry = unsafe { guard.wheel.unlink(node) };
        Some(entry.value)
    }

    /// Returns the current number of entries, counting entries that have
    /// expired but not yet been collected by the wheel.
    pub fn len(&self) -> usize {
        self.state.read().map.len()
    }

    /// Returns `true` if the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.state.read().map.is_empty()
    }

    /// Signals the background tick thread to terminate. Idempotent.
    ///
    /// After `stop` the wheel no longer advances: `get` still honors exact
    /// expiry instants, but dead entries linger until overwritten or
    /// removed.
    pub fn stop(&self) {
        self.stop_tx.lock().take();
    }
}

impl<K, V, S> Drop for TtlCache<K, V, S> {
    fn drop(&mut self) {
        self.stop_tx.lock().take();
        if let Some(handle) = self.ticker.lock().take() {
            let _ = handle.join();
        }
    }
}

impl<K, V, S> fmt::Debug for TtlCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_set_get() {
        let cache: TtlCache<u32, &str> = TtlCache::new();
        cache.set(1, "a", Duration::from_secs(5));
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.len(), 1);
        cache.stop();
    }

    #[test]
    fn test_ttl_get_miss_after_expiry_instant() {
        let cache: TtlCache<u32, &str> = TtlCache::new();
        // a stopped wheel never collects, so the miss below is purely the
        // expiry check in get
        cache.stop();
        cache.set(1, "a", Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_overwrite_replaces_entry() {
        let cache: TtlCache<u32, &str> = TtlCache::new();
        cache.set(1, "a", Duration::from_millis(5));
        cache.set(1, "a2", Duration::from_secs(5));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&1), Some("a2"));
        assert_eq!(cache.len(), 1);
        cache.stop();
    }

    #[test]
    fn test_ttl_remove() {
        let cache: TtlCache<u32, &str> = TtlCache::new();
        cache.set(1, "a", Duration::from_secs(5));
        assert_eq!(cache.remove(&1), Some("a"));
        assert_eq!(cache.remove(&1), None);
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
        cache.stop();
    }

    #[test]
    fn test_ttl_stop_is_idempotent() {
        let cache: TtlCache<u32, u32> = TtlCache::new();
        cache.set(1, 1, Duration::from_secs(5));
        cache.stop();
        cache.stop();
        // set and get stay usable after stop
        cache.set(2, 2, Duration::from_secs(5));
        assert_eq!(cache.get(&2), Some(2));
    }

    #[test]
    fn test_ttl_background_collection() {
        let cache: TtlCache<u32, &str> = TtlCache::new();
        cache.set(1, "a", Duration::from_millis(20));
        assert_eq!(cache.get(&1), Some("a"));

        // one level-0 revolution bounds cleanup latency for sub-second
        // TTLs; give it slack for slow CI
        let deadline = Instant::now() + Duration::from_secs(5);
        while cache.len() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(25));
        }
        assert_eq!(cache.len(), 0);
        cache.stop();
    }

    #[test]
    fn test_ttl_shared_across_threads() {
        use std::sync::Arc;
        use std::vec::Vec;

        let cache: Arc<TtlCache<u32, u32>> = Arc::new(TtlCache::new());
        let mut handles: Vec<thread::JoinHandle<()>> = Vec::new();
        for t in 0..4u32 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..200u32 {
                    let key = t * 1000 + i;
                    cache.set(key, i, Duration::from_millis(50 + u64::from(i)));
                    let _ = cache.get(&key);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 800);
        cache.stop();
    }

    #[test]
    fn test_ttl_drop_without_stop() {
        let cache: TtlCache<u32, u32> = TtlCache::new();
        cache.set(1, 1, Duration::from_secs(60));
        drop(cache); // must not hang or leak the ticker
    }
}
