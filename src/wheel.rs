//! Hierarchical Timing Wheel
//!
//! Three arrays of slots, each slot an intrusive list of pending entries:
//!
//! | Level | Slots | Slot width | Coverage |
//! |-------|-------|------------|----------|
//! | 0 | 512 | 1 ms | ~512 ms |
//! | 1 | 256 | 512 ms | ~131 s |
//! | 2 | 256 | 131,072 ms | ~9.3 h |
//!
//! A global 32-bit tick advances once per millisecond. Every tick sweeps
//! the level-0 slot under the hand; when the level-0 hand wraps, the
//! level-1 slot under its hand is drained and each entry is re-placed by
//! its remaining time to expiry (descending a level, or expiring on the
//! spot); likewise for level 2 when level 1 wraps. Each entry is therefore
//! touched O(1) times over its lifetime, with no per-entry timer and no
//! global scan.
//!
//! The wheel is a pure data structure: it never looks at a clock by itself,
//! the caller passes `now` in. That keeps the TTL cache's lock discipline
//! in one place and makes tick-by-tick simulation in tests trivial.
//!
//! The maximum expressible TTL is one full level-2 revolution
//! (256 × 131,072 ms ≈ 9.5 h); longer TTLs are clamped, and the clamped
//! expiry is what the entry records.

use crate::list::{List, Node};
use alloc::vec::Vec;
use core::fmt;
use core::mem;
use std::time::{Duration, Instant};

/// Slot counts per level.
const SLOTS: [u32; 3] = [512, 256, 256];

/// Milliseconds covered by one slot, per level.
const SLOT_MS: [u32; 3] = [1, 512, 131_072];

/// Longest expressible TTL: one full level-2 revolution.
pub(crate) const MAX_TTL_MS: u64 = 256 * 131_072;

/// Identifies the slot whose list currently links an entry.
///
/// A back-reference in index form: enough to find the owning list for an
/// O(1) unlink on overwrite or removal, never dereferenced on its own.
#[derive(Clone, Copy, Debug)]
struct SlotRef {
    level: u8,
    slot: u16,
}

/// An entry pending expiration.
pub(crate) struct TtlEntry<K, V> {
    /// The cached key; echoed to the expiry callback so the owner can drop
    /// its map slot.
    pub(crate) key: K,
    /// The cached value.
    pub(crate) value: V,
    /// Absolute expiry instant; `get` honors this exactly, the wheel only
    /// bounds how late cleanup may run.
    pub(crate) expires_at: Instant,
    /// Which slot currently lists this entry. Only meaningful while the
    /// entry is linked.
    home: SlotRef,
}

/// Node type stored in wheel slots; the TTL cache's map points at these.
pub(crate) type TtlNode<K, V> = Node<TtlEntry<K, V>>;

/// The three-level wheel plus its tick counter.
pub(crate) struct Wheel<K, V> {
    /// Global tick, advanced once per ~1 ms by the owner.
    tick: u32,
    slots: [Vec<List<TtlEntry<K, V>>>; 3],
}

impl<K, V> Wheel<K, V> {
    /// Creates an empty wheel with all slot lists allocated.
    pub(crate) fn new() -> Self {
        let make_level = |n: u32| (0..n).map(|_| List::new()).collect::<Vec<_>>();
        Wheel {
            tick: 0,
            slots: [
                make_level(SLOTS[0]),
                make_level(SLOTS[1]),
                make_level(SLOTS[2]),
            ],
        }
    }

    /// Converts a TTL to whole milliseconds, saturating instead of
    /// overflowing for absurd durations.
    fn ttl_ms(ttl: Duration) -> u64 {
        u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
    }

    /// Picks the level and slot for an entry `ms` milliseconds from expiry,
    /// relative to the current tick. `ms` must already be clamped.
    fn position(&self, ms: u64) -> SlotRef {
        debug_assert!(ms <= MAX_TTL_MS);
        let tick = u64::from(self.tick);
        let (level, slot) = if ms < u64::from(SLOT_MS[1]) {
            (0, (tick + ms) % u64::from(SLOTS[0]))
        } else if ms < u64::from(SLOT_MS[2]) {
            let width = u64::from(SLOT_MS[1]);
            (1, (tick / width + ms / width) % u64::from(SLOTS[1]))
        } else {
            let width = u64::from(SLOT_MS[2]);
            (2, (tick / width + ms / width) % u64::from(SLOTS[2]))
        };
        SlotRef {
            level,
            slot: slot as u16,
        }
    }

    /// The slot index the given level's hand is over at the current tick.
    fn hand(&self, level: usize) -> usize {
        ((self.tick / SLOT_MS[level]) % SLOTS[level]) as usize
    }

    /// Links a new entry, clamping `ttl` to the wheel's maximum. Entries
    /// are appended at the slot tail, preserving arrival order within a
    /// slot.
    ///
    /// The returned pointer stays valid until the entry expires or is
    /// unlinked; cascading re-places nodes without reallocating them.
    pub(crate) fn insert(
        &mut self,
        key: K,
        value: V,
        ttl: Duration,
        now: Instant,
    ) -> *mut TtlNode<K, V> {
        let mut ms = Self::ttl_ms(ttl);
        let expires_at = if ms > MAX_TTL_MS {
            ms = MAX_TTL_MS;
            now + Duration::from_millis(MAX_TTL_MS)
        } else {
            now + ttl
        };
        let home = self.position(ms);
        let entry = TtlEntry {
            key,
            value,
            expires_at,
            home,
        };
        self.slots[home.level as usize][home.slot as usize].push_back(entry)
    }

    /// Unlinks an entry via its slot back-reference and returns it.
    ///
    /// # Safety
    ///
    /// `node` must be a live node previously returned by [`Wheel::insert`]
    /// on this wheel and not yet expired or unlinked.
    pub(crate) unsafe fn unlink(&mut self, node: *mut TtlNode<K, V>) -> TtlEntry<K, V> {
        // SAFETY: node is live per the caller's contract
        let home = unsafe { (*node).value().home };
        // SAFETY: the back-reference names the list that links the node
        unsafe { self.slots[home.level as usize][home.slot as usize].unlink(node) }
    }

    /// Advances the wheel by one tick: sweeps the level-0 slot under the
    /// hand and cascades the higher levels whenever the hand below them
    /// wraps. `on_expire` receives the key of every entry whose expiry has
    /// passed; the entry itself is dropped here.
    pub(crate) fn advance<F: FnMut(K)>(&mut self, now: Instant, mut on_expire: F) {
        self.tick = self.tick.wrapping_add(1);
        self.sweep(now, &mut on_expire);
        if self.tick % SLOTS[0] == 0 {
            self.cascade(1, now, &mut on_expire);
        }
        if self.tick % (SLOT_MS[2]) == 0 {
            self.cascade(2, now, &mut on_expire);
        }
    }

    /// Expires due entries in the level-0 slot under the hand. Entries that
    /// were re-placed here with time still left (or that wrapped around)
    /// stay for a later revolution.
    fn sweep<F: FnMut(K)>(&mut self, now: Instant, on_expire: &mut F) {
        let list = &mut self.slots[0][(self.tick % SLOTS[0]) as usize];
        let mut cur = list.first();
        while cur != list.end() {
            // SAFETY: cur is a live node of this slot list
            let next = unsafe { Node::next_ptr(cur) };
            // SAFETY: cur is non-sigil while it isn't the end sentinel
            if unsafe { (*cur).value().expires_at <= now } {
                // SAFETY: cur is linked in `list`; the owner drops its map
                // pointer in the on_expire callback
                let entry = unsafe { list.unlink(cur) };
                on_expire(entry.key);
            }
            cur = next;
        }
    }

    /// Drains the slot under `level`'s hand, expiring entries whose time
    /// has run out and re-placing the rest by their remaining TTL. Node
    /// allocations are preserved so map pointers stay valid.
    fn cascade<F: FnMut(K)>(&mut self, level: usize, now: Instant, on_expire: &mut F) {
        let hand = self.hand(level);
        log::trace!("cascading wheel {} slot {}", level, hand);

        // Swap the slot out so re-placement can borrow the rest of the
        // wheel. Remaining TTLs below one slot width always descend a
        // level, so nothing re-places into the slot being drained.
        let mut drained = mem::replace(&mut self.slots[level][hand], List::new());
        while let Some(node) = drained.pop_front_node() {
            // SAFETY: node was just detached and is non-sigil
            let expires_at = unsafe { (*node).value().expires_at };
            if expires_at <= now {
                // SAFETY: node is detached and unreferenced by any list
                let entry = unsafe { List::consume(node) };
                on_expire(entry.key);
            } else {
                let remaining = Self::ttl_ms(expires_at.saturating_duration_since(now));
                let home = self.position(remaining);
                // SAFETY: node is detached; re-link it under its new home
                unsafe {
                    (*node).value_mut().home = home;
                    self.slots[home.level as usize][home.slot as usize].attach_back(node);
                }
            }
        }
    }
}

impl<K, V> fmt::Debug for Wheel<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wheel").field("tick", &self.tick).finish()
    }
}
