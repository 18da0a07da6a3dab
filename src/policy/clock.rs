//! Clock (second-chance) cache over a single open-addressed slot array.
//!
//! Entries live directly in the probe table; there is no separate index and
//! no tombstone state. A persistent clock hand sweeps the same array to pick
//! victims.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                   ClockEvictionCache<K, V> Layout                           │
//! │                                                                             │
//! │   slots: Box<[Option<Entry<K, V>>]>   (len ≈ 3 × max_size, power of two)   │
//! │                                                                             │
//! │    [0]     [1]     [2]     [3]     [4]     [5]     [6]     [7]    ...       │
//! │   ┌───┐   ┌───┐   ┌───┐   ┌───┐   ┌───┐   ┌───┐   ┌───┐   ┌───┐             │
//! │   │   │   │ A │   │ B │   │   │   │ C │   │ D │   │   │   │   │             │
//! │   │   │   │ref│   │   │   │   │   │   │   │ref│   │   │   │   │             │
//! │   └───┘   └───┘   └───┘   └───┘   └───┘   └───┘   └───┘   └───┘             │
//! │             ▲       ▲                                                       │
//! │             │       └─ B hashed to [1], probed to the next free slot        │
//! │             hand (never reset)                                              │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm
//!
//! ```text
//! GET(key):
//!   probe from mix(hash(key)) & mask until key or an empty slot
//!   set second_chance = true
//!
//! PUT(key, value):
//!   existing key: replace value, set second_chance = true
//!   otherwise:    store in first empty slot of the chain, second_chance = false
//!                 if len > max_size: EVICT(skip = new slot)
//!
//! EVICT(skip):
//!   loop:
//!     idx = hand; hand = (hand + 1) & mask
//!     empty or idx == skip  → continue
//!     second_chance         → second_chance = false
//!     otherwise             → remove slot idx, COMPACT, return
//!
//! COMPACT(freed):
//!   for each occupied slot after `freed` up to the next empty slot:
//!     take the entry out and re-insert it from its home slot
//! ```
//!
//! A fresh entry is never the victim of the eviction its own insert triggers,
//! and it starts without a second chance, so a key read before the insert
//! outlives keys that were never read.
//!
//! ## Performance Characteristics
//!
//! | Operation | Time    | Notes                                   |
//! |-----------|---------|-----------------------------------------|
//! | `get`     | O(1)    | Probe + bit set                         |
//! | `put`     | O(1)*   | *Amortized; sweep may pass demoted slots|
//! | `remove`  | O(run)  | Re-homes the following occupied run     |
//! | `clear`   | O(cap)  | Keeps the allocation and the hand       |
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::policy::clock::ClockEvictionCache;
//!
//! let mut cache = ClockEvictionCache::new(4).unwrap();
//! for key in ["a", "b", "c", "d"] {
//!     cache.put(key, key.len());
//! }
//!
//! // Reading "a" gives it a second chance.
//! assert_eq!(cache.get(&"a"), Some(&1));
//!
//! cache.put("e", 1);
//! assert_eq!(cache.len(), 4);
//! assert!(cache.contains(&"a"));
//! assert!(cache.contains(&"e"));
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::mem;

use rustc_hash::FxBuildHasher;

use crate::ds::sizing::{array_size, home_slot};
use crate::error::{ConfigError, InvariantError};
use crate::traits::CoreCache;

/// Fill factor of the slot array; roughly three slots per entry.
const SLOT_FILL_FACTOR: f32 = 1.0 / 3.0;

#[derive(Debug, Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    second_chance: bool,
}

/// Bounded cache with clock (second-chance) eviction.
///
/// Holds at most [`max_size`](Self::max_size) entries. Eviction approximates
/// LRU: entries read since the hand last passed survive one more sweep.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Eq + Hash`
/// - `V`: Value type
/// - `S`: Hash builder, defaults to [`FxBuildHasher`]
#[derive(Clone)]
pub struct ClockEvictionCache<K, V, S = FxBuildHasher> {
    slots: Box<[Option<Entry<K, V>>]>,
    mask: usize,
    hand: usize,
    len: usize,
    max_size: usize,
    hasher: S,
}

impl<K, V> ClockEvictionCache<K, V>
where
    K: Eq + Hash,
{
    /// Smallest accepted `max_size`.
    pub const MIN_SIZE: usize = 4;

    /// Creates a cache bounded to `max_size` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `max_size` is below [`MIN_SIZE`](Self::MIN_SIZE)
    /// or the slot array would exceed 2^30 slots.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::clock::ClockEvictionCache;
    ///
    /// let cache: ClockEvictionCache<u64, u64> = ClockEvictionCache::new(4).unwrap();
    /// assert_eq!(cache.max_size(), 4);
    /// assert_eq!(cache.capacity(), 16);
    ///
    /// assert!(ClockEvictionCache::<u64, u64>::new(3).is_err());
    /// ```
    pub fn new(max_size: usize) -> Result<Self, ConfigError> {
        Self::with_hasher(max_size, FxBuildHasher)
    }
}

impl<K, V, S> ClockEvictionCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates a cache that hashes keys with `hasher`.
    pub fn with_hasher(max_size: usize, hasher: S) -> Result<Self, ConfigError> {
        let min = ClockEvictionCache::<K, V>::MIN_SIZE;
        if max_size < min {
            return Err(ConfigError::below_minimum("max size", max_size, min));
        }
        let capacity = array_size(max_size, SLOT_FILL_FACTOR)?;
        Ok(Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            mask: capacity - 1,
            hand: 0,
            len: 0,
            max_size,
            hasher,
        })
    }

    /// Returns the number of cached entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the entry bound.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the number of slots in the probe array.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the value for `key` and marks it recently used.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = self.find(key)?;
        let entry = self.slots[idx].as_mut()?;
        entry.second_chance = true;
        Some(&entry.value)
    }

    /// Returns the value for `key` without touching its reference bit.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = self.find(key)?;
        self.slots[idx].as_ref().map(|entry| &entry.value)
    }

    /// Returns `true` if `key` is cached. Does not touch the reference bit.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts or updates `key`, returning the replaced value.
    ///
    /// Updating an existing key counts as a use. Inserting a new key may
    /// evict one other entry.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let mut idx = home_slot(&self.hasher, &key, self.mask);
        loop {
            match &mut self.slots[idx] {
                None => break,
                Some(entry) if entry.key == key => {
                    entry.second_chance = true;
                    return Some(mem::replace(&mut entry.value, value));
                },
                Some(_) => {},
            }
            idx = (idx + 1) & self.mask;
        }

        // Starting unreferenced and shielding the fresh slot departs from the
        // classic "insert referenced" clock; it keeps a touched entry from
        // losing to a key that has never been read.
        self.slots[idx] = Some(Entry {
            key,
            value,
            second_chance: false,
        });
        self.len += 1;

        if self.len > self.max_size {
            self.evict_one(idx);
        }
        None
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.find(key)?;
        self.take_and_compact(idx).map(|entry| entry.value)
    }

    /// Iterates over cached keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.slots.iter().flatten().map(|entry| &entry.key)
    }

    /// Removes every entry. The clock hand keeps its position.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.len = 0;
        log::debug!("clock cache cleared (max size {})", self.max_size);
    }

    /// Counts occupied slots by scanning the array.
    ///
    /// Always equals [`len`](Self::len); exposed so tests can check it.
    pub fn occupied_slot_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns `(key, second_chance)` for every slot in array order.
    pub fn debug_snapshot_slots(&self) -> Vec<Option<(&K, bool)>> {
        self.slots
            .iter()
            .map(|slot| slot.as_ref().map(|entry| (&entry.key, entry.second_chance)))
            .collect()
    }

    /// Verifies the size bound, the slot count and probe reachability.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.len > self.max_size {
            return Err(InvariantError::new(format!(
                "len {} exceeds max size {}",
                self.len, self.max_size
            )));
        }
        let occupied = self.occupied_slot_count();
        if occupied != self.len {
            return Err(InvariantError::new(format!(
                "len {} does not match {} occupied slots",
                self.len, occupied
            )));
        }
        if self.hand > self.mask {
            return Err(InvariantError::new(format!(
                "hand {} outside {} slots",
                self.hand,
                self.capacity()
            )));
        }
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(entry) = slot {
                if self.find(&entry.key) != Some(idx) {
                    return Err(InvariantError::new(format!(
                        "key in slot {idx} is unreachable from its home slot"
                    )));
                }
            }
        }
        Ok(())
    }

    fn find(&self, key: &K) -> Option<usize> {
        let mut idx = home_slot(&self.hasher, key, self.mask);
        loop {
            match &self.slots[idx] {
                None => return None,
                Some(entry) if entry.key == *key => return Some(idx),
                Some(_) => {},
            }
            idx = (idx + 1) & self.mask;
        }
    }

    // Only called with len > max_size, so some slot other than `skip` is
    // occupied and the sweep ends within two turns.
    fn evict_one(&mut self, skip: usize) {
        loop {
            let idx = self.hand;
            self.hand = (self.hand + 1) & self.mask;
            if idx == skip {
                continue;
            }
            let Some(entry) = self.slots[idx].as_mut() else {
                continue;
            };
            if entry.second_chance {
                entry.second_chance = false;
            } else {
                self.take_and_compact(idx);
                return;
            }
        }
    }

    fn take_and_compact(&mut self, idx: usize) -> Option<Entry<K, V>> {
        let removed = self.slots[idx].take()?;
        self.len -= 1;

        let mut next = (idx + 1) & self.mask;
        while let Some(entry) = self.slots[next].take() {
            let mut target = home_slot(&self.hasher, &entry.key, self.mask);
            while self.slots[target].is_some() {
                target = (target + 1) & self.mask;
            }
            self.slots[target] = Some(entry);
            next = (next + 1) & self.mask;
        }
        Some(removed)
    }
}

impl<K, V, S> CoreCache<K, V> for ClockEvictionCache<K, V, S>
where
    K: Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    #[inline]
    fn get(&mut self, key: &K) -> Option<V> {
        ClockEvictionCache::get(self, key).cloned()
    }

    #[inline]
    fn put(&mut self, key: K, value: V) -> Option<V> {
        ClockEvictionCache::put(self, key, value)
    }

    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        ClockEvictionCache::remove(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        ClockEvictionCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        ClockEvictionCache::clear(self);
    }
}

impl<K, V, S> fmt::Debug for ClockEvictionCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockEvictionCache")
            .field("len", &self.len)
            .field("max_size", &self.max_size)
            .field("capacity", &self.slots.len())
            .field("hand", &self.hand)
            .finish_non_exhaustive()
    }
}
