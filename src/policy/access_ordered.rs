//! Exact LRU cache: hash index plus an intrusive recency list.
//!
//! The correctness baseline for the approximate caches. Every read reorders,
//! and an insert beyond capacity always evicts the true least-recently-used
//! entry. Use it when approximate eviction is unacceptable.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>          list: IntrusiveList<(K, V)>
//!   ┌──────────┬────────┐
//!   │  "a"     │ id_2   │──────┐     head (MRU)                tail (LRU)
//!   │  "b"     │ id_0   │───┐  │        │                         │
//!   │  "c"     │ id_1   │─┐ │  └──────► [a] ◄──► [c] ◄──► [b] ◄───┘
//!   └──────────┴────────┘ │ │                   ▲        ▲
//!                         │ └───────────────────┼────────┘
//!                         └─────────────────────┘
//! ```
//!
//! | Operation  | Time | Notes                            |
//! |------------|------|----------------------------------|
//! | `get`      | O(1) | Moves the entry to the front     |
//! | `peek`     | O(1) | No reordering                    |
//! | `put`      | O(1) | Evicts the tail when full        |
//! | `remove`   | O(1) | Unlinks and frees the node       |
//!
//! ## Thread Safety
//!
//! [`BoundedAccessOrderedCache`] needs `&mut self` for reads as well as
//! writes. [`ConcurrentBoundedAccessOrderedCache`] wraps it in a
//! `parking_lot::Mutex`; every operation serializes on that lock.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::policy::access_ordered::BoundedAccessOrderedCache;
//!
//! let mut cache = BoundedAccessOrderedCache::new(2).unwrap();
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.peek_lru(), Some((&"a", &1)));
//! ```

use std::fmt;
use std::hash::Hash;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::{ConfigError, InvariantError};
use crate::traits::CoreCache;

/// Bounded map that evicts the least recently used entry.
pub struct BoundedAccessOrderedCache<K, V> {
    index: FxHashMap<K, SlotId>,
    list: IntrusiveList<(K, V)>,
    capacity: usize,
}

impl<K, V> BoundedAccessOrderedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::below_minimum("capacity", capacity, 1));
        }
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: IntrusiveList::with_capacity(capacity),
            capacity,
        })
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.move_to_front(id);
        self.list.get(id).map(|(_, value)| value)
    }

    /// Returns the value for `key` without reordering.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|(_, value)| value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts or updates `key` and marks it most recently used.
    ///
    /// Evicts the least recently used entry when a new key would exceed the
    /// capacity.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_front(id);
            return self
                .list
                .get_mut(id)
                .map(|(_, slot)| std::mem::replace(slot, value));
        }

        if self.list.len() >= self.capacity {
            self.pop_lru();
        }
        let id = self.list.push_front((key.clone(), value));
        self.index.insert(key, id);
        None
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|(_, value)| value)
    }

    /// Returns the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|(key, value)| (key, value))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (key, value) = self.list.pop_back()?;
        self.index.remove(&key);
        Some((key, value))
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list.iter().map(|(key, value)| (key, value))
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
        log::debug!("access-ordered cache cleared (capacity {})", self.capacity);
    }

    /// Checks that the index and the recency list describe the same entries.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some((stored, _)) if stored == key => {},
                _ => return Err(InvariantError::new("index points at the wrong node")),
            }
        }
        Ok(())
    }
}

impl<K, V> CoreCache<K, V> for BoundedAccessOrderedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        BoundedAccessOrderedCache::get(self, key).cloned()
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        BoundedAccessOrderedCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        BoundedAccessOrderedCache::remove(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn clear(&mut self) {
        BoundedAccessOrderedCache::clear(self);
    }
}

impl<K, V> fmt::Debug for BoundedAccessOrderedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedAccessOrderedCache")
            .field("len", &self.list.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// [`BoundedAccessOrderedCache`] behind a mutex, for exact LRU across threads.
#[cfg(feature = "concurrency")]
pub struct ConcurrentBoundedAccessOrderedCache<K, V> {
    inner: Mutex<BoundedAccessOrderedCache<K, V>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentBoundedAccessOrderedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a shared cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Mutex::new(BoundedAccessOrderedCache::new(capacity)?),
        })
    }

    /// Returns a clone of the value for `key` and marks it most recently used.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().put(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> CoreCache<K, V> for ConcurrentBoundedAccessOrderedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        self.inner.get_mut().get(key).cloned()
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.inner.get_mut().put(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.get_mut().remove(key)
    }

    fn contains(&self, key: &K) -> bool {
        ConcurrentBoundedAccessOrderedCache::contains(self, key)
    }

    fn len(&self) -> usize {
        ConcurrentBoundedAccessOrderedCache::len(self)
    }

    fn clear(&mut self) {
        self.inner.get_mut().clear();
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> crate::traits::ConcurrentCache for ConcurrentBoundedAccessOrderedCache<K, V>
where
    K: Send,
    V: Send,
{
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentBoundedAccessOrderedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentBoundedAccessOrderedCache")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_mru_first(cache: &BoundedAccessOrderedCache<&'static str, i32>) -> Vec<&'static str> {
        cache.iter().map(|(key, _)| *key).collect()
    }

    mod basic_operations {
        use super::*;

        #[test]
        fn test_put_get_round_trip() {
            let mut cache = BoundedAccessOrderedCache::new(3).unwrap();
            assert_eq!(cache.put("a", 1), None);
            assert_eq!(cache.put("a", 2), Some(1));
            assert_eq!(cache.get(&"a"), Some(&2));
            assert_eq!(cache.get(&"z"), None);
            assert_eq!(cache.len(), 1);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_remove_and_clear() {
            let mut cache = BoundedAccessOrderedCache::new(3).unwrap();
            cache.put("a", 1);
            cache.put("b", 2);
            assert_eq!(cache.remove(&"a"), Some(1));
            assert_eq!(cache.remove(&"a"), None);
            assert_eq!(cache.len(), 1);

            cache.clear();
            cache.clear();
            assert!(cache.is_empty());
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_zero_capacity_rejected() {
            let err = BoundedAccessOrderedCache::<u8, u8>::new(0).unwrap_err();
            assert!(err.message().contains("capacity"));
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn test_evicts_true_lru() {
            let mut cache = BoundedAccessOrderedCache::new(3).unwrap();
            cache.put("a", 1);
            cache.put("b", 2);
            cache.put("c", 3);
            cache.get(&"a");
            cache.put("d", 4);

            assert!(!cache.contains(&"b"));
            assert_eq!(keys_mru_first(&cache), vec!["d", "a", "c"]);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_peek_does_not_reorder() {
            let mut cache = BoundedAccessOrderedCache::new(2).unwrap();
            cache.put("a", 1);
            cache.put("b", 2);
            assert_eq!(cache.peek(&"a"), Some(&1));
            cache.put("c", 3);
            assert!(!cache.contains(&"a"));
        }

        #[test]
        fn test_update_moves_to_front() {
            let mut cache = BoundedAccessOrderedCache::new(2).unwrap();
            cache.put("a", 1);
            cache.put("b", 2);
            cache.put("a", 10);
            cache.put("c", 3);
            assert_eq!(cache.peek(&"a"), Some(&10));
            assert!(!cache.contains(&"b"));
        }

        #[test]
        fn test_pop_lru_order() {
            let mut cache = BoundedAccessOrderedCache::new(3).unwrap();
            cache.put("a", 1);
            cache.put("b", 2);
            cache.put("c", 3);
            cache.get(&"a");

            assert_eq!(cache.peek_lru(), Some((&"b", &2)));
            assert_eq!(cache.pop_lru(), Some(("b", 2)));
            assert_eq!(cache.pop_lru(), Some(("c", 3)));
            assert_eq!(cache.pop_lru(), Some(("a", 1)));
            assert_eq!(cache.pop_lru(), None);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_capacity_one() {
            let mut cache = BoundedAccessOrderedCache::new(1).unwrap();
            cache.put("a", 1);
            cache.put("b", 2);
            assert_eq!(keys_mru_first(&cache), vec!["b"]);
        }
    }

    mod property_tests {
        use std::collections::VecDeque;

        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Property: eviction order matches a naive recency model.
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_matches_naive_lru(
                capacity in 1usize..8,
                ops in prop::collection::vec((any::<bool>(), 0u8..16), 0..200),
            ) {
                let mut cache = BoundedAccessOrderedCache::new(capacity).unwrap();
                let mut model: VecDeque<u8> = VecDeque::new();

                for (is_put, key) in ops {
                    let pos = model.iter().position(|&k| k == key);
                    if is_put {
                        cache.put(key, u32::from(key));
                        if let Some(pos) = pos {
                            model.remove(pos);
                        } else if model.len() == capacity {
                            model.pop_back();
                        }
                        model.push_front(key);
                    } else {
                        prop_assert_eq!(cache.get(&key).is_some(), pos.is_some());
                        if let Some(pos) = pos {
                            model.remove(pos);
                            model.push_front(key);
                        }
                    }
                }

                let order: Vec<u8> = cache.iter().map(|(k, _)| *k).collect();
                prop_assert_eq!(order, model.into_iter().collect::<Vec<_>>());
                prop_assert!(cache.check_invariants().is_ok());
            }
        }
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use std::sync::Arc;
        use std::thread;

        use super::*;

        #[test]
        fn test_shared_exact_lru() {
            let cache = Arc::new(ConcurrentBoundedAccessOrderedCache::new(64).unwrap());
            let handles: Vec<_> = (0..4u64)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        for i in 0..200u64 {
                            cache.put(t * 1_000 + i, i);
                            cache.get(&(t * 1_000 + i / 2));
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(cache.len(), 64);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_wrapper_delegates() {
            let cache = ConcurrentBoundedAccessOrderedCache::new(2).unwrap();
            cache.put("a", 1);
            cache.put("b", 2);
            assert_eq!(cache.get(&"a"), Some(1));
            cache.put("c", 3);
            assert!(!cache.contains(&"b"));
            assert_eq!(cache.peek(&"c"), Some(3));
            assert_eq!(cache.pop_lru(), Some(("a", 1)));
            assert_eq!(cache.remove(&"c"), Some(3));
            assert!(cache.is_empty());
        }
    }
}
