//! Open-addressing hash table with tombstones.
//!
//! Stores every entry directly in one flat slot array and resolves collisions
//! by linear probing. This is the storage primitive behind the single-threaded
//! [`GenerationalCache`](crate::policy::generational::GenerationalCache).
//!
//! ## Architecture
//!
//! ```text
//!   slots: Box<[Slot<K, V>]>   (len = power of two, mask = len - 1)
//!
//!    [0]      [1]       [2]      [3]      [4]      [5]      [6]      [7]
//!   ┌──────┐ ┌───────┐ ┌──────┐ ┌──────┐ ┌──────┐ ┌──────┐ ┌──────┐ ┌──────┐
//!   │ Free │ │ (a,1) │ │ Tomb │ │(c,3) │ │ Free │ │ Free │ │(d,4) │ │ Free │
//!   └──────┘ └───────┘ └──────┘ └──────┘ └──────┘ └──────┘ └──────┘ └──────┘
//!               ▲                   ▲
//!               │                   └─ c hashed to [1], displaced past the
//!               │                      tombstone left by a removed key
//!            home slot = mix(hash(key)) & mask
//! ```
//!
//! ## Probing
//!
//! - Lookups walk `+1` (wrapping) from the home slot until the key or a
//!   `Free` slot is found. Tombstones are walked over.
//! - Inserts remember the first tombstone on the chain and reuse it.
//! - Removes leave a tombstone so keys displaced past the slot stay
//!   reachable. When the next slot is already `Free` no chain can pass
//!   through, so the slot is freed outright.
//!
//! ## Growth
//!
//! The table doubles once the live count reaches `capacity * fill_factor`.
//! When live entries plus tombstones reach that threshold but the live count
//! alone does not, the table is rebuilt at the same size to drop the
//! tombstones. Either way at least one `Free` slot remains, which terminates
//! every probe. The table never shrinks.
//!
//! ## Performance
//!
//! | Operation | Time        | Notes                                 |
//! |-----------|-------------|---------------------------------------|
//! | `get`     | O(1) avg    | Probe length bounded by fill factor   |
//! | `put`     | O(1) amort. | Rehash is O(capacity)                 |
//! | `remove`  | O(1) avg    | Leaves a tombstone                    |
//! | `clear`   | O(capacity) | Keeps the allocation                  |
//!
//! ## Example
//!
//! ```
//! use lrukit::ds::OpenAddressingTable;
//!
//! let mut table = OpenAddressingTable::new(16, 0.5).unwrap();
//! table.put("a", 1);
//! table.put("b", 2);
//! assert_eq!(table.get(&"a"), Some(&1));
//!
//! assert_eq!(table.remove(&"a"), Some(1));
//! assert_eq!(table.get(&"a"), None);
//!
//! table.put("a", 3);
//! assert_eq!(table.get(&"a"), Some(&3));
//! assert_eq!(table.len(), 2);
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::mem;

use rustc_hash::FxBuildHasher;

use crate::ds::sizing::{MAX_TABLE_CAPACITY, array_size, home_slot, validate_fill_factor};
use crate::error::{ConfigError, InvariantError};

const DEFAULT_SLOT_COUNT: usize = 32;
const DEFAULT_FILL_FACTOR: f32 = 0.5;

#[derive(Debug, Clone)]
enum Slot<K, V> {
    Free,
    Tombstone,
    Occupied(K, V),
}

/// Single-threaded open-addressing hash map with tombstone deletion.
///
/// Not a general-purpose map: there is no entry API, iteration order follows
/// slot order and carries no meaning.
#[derive(Clone)]
pub struct OpenAddressingTable<K, V, S = FxBuildHasher> {
    slots: Box<[Slot<K, V>]>,
    mask: usize,
    len: usize,
    tombstones: usize,
    threshold: usize,
    fill_factor: f32,
    hasher: S,
}

impl<K, V> OpenAddressingTable<K, V>
where
    K: Eq + Hash,
{
    /// Creates a table sized for `expected_size` entries at `fill_factor`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `expected_size` is zero, `fill_factor` is
    /// outside `(0, 1)`, or the required capacity exceeds 2^30 slots.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::ds::OpenAddressingTable;
    ///
    /// let table: OpenAddressingTable<u64, u64> = OpenAddressingTable::new(16, 0.5).unwrap();
    /// assert_eq!(table.capacity(), 32);
    ///
    /// assert!(OpenAddressingTable::<u64, u64>::new(16, 1.0).is_err());
    /// assert!(OpenAddressingTable::<u64, u64>::new(0, 0.5).is_err());
    /// ```
    pub fn new(expected_size: usize, fill_factor: f32) -> Result<Self, ConfigError> {
        Self::with_hasher(expected_size, fill_factor, FxBuildHasher)
    }
}

impl<K, V, S> OpenAddressingTable<K, V, S> {
    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots in the backing array.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the configured fill factor.
    #[inline]
    pub fn fill_factor(&self) -> f32 {
        self.fill_factor
    }
}

impl<K, V, S> OpenAddressingTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates a table that hashes keys with `hasher`.
    pub fn with_hasher(
        expected_size: usize,
        fill_factor: f32,
        hasher: S,
    ) -> Result<Self, ConfigError> {
        if expected_size == 0 {
            return Err(ConfigError::new("expected size must be > 0"));
        }
        validate_fill_factor(fill_factor)?;
        let capacity = array_size(expected_size, fill_factor)?;
        Ok(Self::with_slot_count(capacity, fill_factor, hasher))
    }

    fn with_slot_count(capacity: usize, fill_factor: f32, hasher: S) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            slots: free_slots(capacity),
            mask: capacity - 1,
            len: 0,
            tombstones: 0,
            threshold: threshold_for(capacity, fill_factor),
            fill_factor,
            hasher,
        }
    }

    /// Returns a reference to the value stored for `key`.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        let idx = self.find(key)?;
        match &self.slots[idx] {
            Slot::Occupied(_, value) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value stored for `key`.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find(key)?;
        match &mut self.slots[idx] {
            Slot::Occupied(_, value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// May grow the table or purge tombstones.
    ///
    /// # Panics
    ///
    /// Panics if the insert needs the table to grow beyond 2^30 slots.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let mut idx = home_slot(&self.hasher, &key, self.mask);
        let mut first_tombstone = None;

        loop {
            match &mut self.slots[idx] {
                Slot::Free => break,
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(idx);
                    }
                },
                Slot::Occupied(existing, current) if *existing == key => {
                    return Some(mem::replace(current, value));
                },
                Slot::Occupied(..) => {},
            }
            idx = (idx + 1) & self.mask;
        }

        if let Some(tombstone) = first_tombstone {
            self.slots[tombstone] = Slot::Occupied(key, value);
            self.tombstones -= 1;
            self.len += 1;
        } else {
            self.slots[idx] = Slot::Occupied(key, value);
            self.len += 1;
        }

        self.maybe_rehash();
        None
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.find(key)?;
        let next_is_free = matches!(self.slots[(idx + 1) & self.mask], Slot::Free);
        let marker = if next_is_free {
            Slot::Free
        } else {
            self.tombstones += 1;
            Slot::Tombstone
        };

        match mem::replace(&mut self.slots[idx], marker) {
            Slot::Occupied(_, value) => {
                self.len -= 1;
                Some(value)
            },
            _ => None,
        }
    }

    /// Removes every entry, keeping the allocated slot array.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Free;
        }
        self.len = 0;
        self.tombstones = 0;
    }

    /// Iterates over the keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over the values in slot order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Iterates over `(key, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(key, value) => Some((key, value)),
            _ => None,
        })
    }

    fn find(&self, key: &K) -> Option<usize> {
        let mut idx = home_slot(&self.hasher, key, self.mask);
        loop {
            match &self.slots[idx] {
                Slot::Free => return None,
                Slot::Occupied(existing, _) if existing == key => return Some(idx),
                _ => {},
            }
            idx = (idx + 1) & self.mask;
        }
    }

    fn maybe_rehash(&mut self) {
        if self.len + self.tombstones < self.threshold {
            return;
        }

        let capacity = self.capacity();
        if self.len >= self.threshold {
            let grown = grown_capacity(capacity);
            log::trace!(
                "open addressing table growing from {} to {} slots ({} entries)",
                capacity,
                grown,
                self.len
            );
            self.rehash(grown);
        } else {
            log::trace!(
                "open addressing table purging {} tombstones at {} slots",
                self.tombstones,
                capacity
            );
            self.rehash(capacity);
        }
    }

    fn rehash(&mut self, capacity: usize) {
        let old = mem::replace(&mut self.slots, free_slots(capacity));
        self.mask = capacity - 1;
        self.threshold = threshold_for(capacity, self.fill_factor);
        self.tombstones = 0;

        for slot in old.into_vec() {
            if let Slot::Occupied(key, value) = slot {
                let mut idx = home_slot(&self.hasher, &key, self.mask);
                while !matches!(self.slots[idx], Slot::Free) {
                    idx = (idx + 1) & self.mask;
                }
                self.slots[idx] = Slot::Occupied(key, value);
            }
        }
    }

    /// Verifies slot accounting and that every key is reachable from its
    /// home slot.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if !self.capacity().is_power_of_two() || self.mask != self.capacity() - 1 {
            return Err(InvariantError::new(format!(
                "capacity {} is not a power of two matching mask {}",
                self.capacity(),
                self.mask
            )));
        }

        let mut occupied = 0;
        let mut tombstones = 0;
        for (idx, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Free => {},
                Slot::Tombstone => tombstones += 1,
                Slot::Occupied(key, _) => {
                    occupied += 1;
                    if self.find(key) != Some(idx) {
                        return Err(InvariantError::new(format!(
                            "key in slot {idx} is unreachable or duplicated"
                        )));
                    }
                },
            }
        }

        if occupied != self.len {
            return Err(InvariantError::new(format!(
                "len {} does not match {} occupied slots",
                self.len, occupied
            )));
        }
        if tombstones != self.tombstones {
            return Err(InvariantError::new(format!(
                "tombstone count {} does not match {} tombstone slots",
                self.tombstones, tombstones
            )));
        }
        if self.len + self.tombstones >= self.capacity() {
            return Err(InvariantError::new("no free slot left to terminate probes"));
        }
        Ok(())
    }
}

impl<K, V> Default for OpenAddressingTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::with_slot_count(DEFAULT_SLOT_COUNT, DEFAULT_FILL_FACTOR, FxBuildHasher)
    }
}

impl<K, V, S> fmt::Debug for OpenAddressingTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAddressingTable")
            .field("len", &self.len)
            .field("capacity", &self.slots.len())
            .field("tombstones", &self.tombstones)
            .field("fill_factor", &self.fill_factor)
            .finish_non_exhaustive()
    }
}

fn free_slots<K, V>(capacity: usize) -> Box<[Slot<K, V>]> {
    std::iter::repeat_with(|| Slot::Free).take(capacity).collect()
}

/// Doubles `capacity`.
///
/// # Panics
///
/// Panics when the table is already at [`MAX_TABLE_CAPACITY`] slots; past
/// that point no free slot is guaranteed and probes would never terminate.
fn grown_capacity(capacity: usize) -> usize {
    assert!(
        capacity < MAX_TABLE_CAPACITY,
        "open addressing table cannot grow past {MAX_TABLE_CAPACITY} slots"
    );
    capacity * 2
}

fn threshold_for(capacity: usize, fill_factor: f32) -> usize {
    let threshold = (capacity as f64 * f64::from(fill_factor)) as usize;
    threshold.clamp(1, capacity - 1)
}
