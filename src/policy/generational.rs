//! Single-threaded generational cache over three open-addressing tables.
//!
//! Approximates LRU by aging whole tables instead of individual entries.
//! Writes go to the `current` generation; once it holds
//! `max_size / 3` entries the generations rotate and the oldest is dropped.
//!
//! ## Architecture
//!
//! ```text
//!   put(k, v) ─────────────────┐
//!                              ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │   current    │──►│    aging     │──►│   retiring   │──► dropped
//!   │ (writes go   │   │ (read-only)  │   │ (read-only)  │
//!   │   here)      │   │              │   │              │
//!   └──────────────┘   └──────────────┘   └──────────────┘
//!          ▲                  │                  │
//!          └──── get hit ─────┴──────────────────┘
//!                (copied back into current)
//! ```
//!
//! ## Rotation
//!
//! Checked before every write: when `current.len() >= threshold`, the
//! retiring table is cleared and recycled as the new `current`, the old
//! `current` becomes `aging` and the old `aging` becomes `retiring`.
//!
//! ## Size Accounting
//!
//! A key read from an older generation is copied, not moved, so it can be
//! counted twice. [`len`](GenerationalCache::len) is the sum of the three
//! table sizes and may overshoot the number of distinct keys; it never
//! exceeds `max_size` by more than one generation.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::policy::generational::GenerationalCache;
//!
//! let mut cache = GenerationalCache::new(12).unwrap();
//! for i in 1..=13 {
//!     cache.put(i, i * 10);
//! }
//!
//! // The first generation was dropped by the third rotation.
//! assert_eq!(cache.get(&1), None);
//! assert_eq!(cache.get(&5), Some(&50));
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::mem;

use rustc_hash::FxBuildHasher;

use crate::ds::open_addressing::OpenAddressingTable;
use crate::error::ConfigError;
use crate::traits::CoreCache;

/// Smallest accepted `max_size` for both generational caches.
pub const MIN_SIZE: usize = 10;

const DEFAULT_FILL_FACTOR: f32 = 0.5;

/// Three-generation approximate LRU cache for single-threaded use.
///
/// For a thread-safe variant see
/// [`ConcurrentGenerationalCache`](crate::policy::concurrent_generational::ConcurrentGenerationalCache).
pub struct GenerationalCache<K, V, S = FxBuildHasher> {
    current: OpenAddressingTable<K, V, S>,
    aging: OpenAddressingTable<K, V, S>,
    retiring: OpenAddressingTable<K, V, S>,
    max_size: usize,
    threshold: usize,
}

impl<K, V> GenerationalCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates a cache bounded to roughly `max_size` entries, fill factor 0.5.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `max_size` is below [`MIN_SIZE`].
    pub fn new(max_size: usize) -> Result<Self, ConfigError> {
        Self::with_fill_factor(max_size, DEFAULT_FILL_FACTOR)
    }

    /// Creates a cache whose generation tables use `fill_factor`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `max_size` is below [`MIN_SIZE`], the fill
    /// factor is outside `(0, 1)` or a generation table would be too large.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::generational::GenerationalCache;
    ///
    /// let cache: GenerationalCache<u64, u64> =
    ///     GenerationalCache::with_fill_factor(300, 0.75).unwrap();
    /// assert_eq!(cache.generation_threshold(), 100);
    ///
    /// assert!(GenerationalCache::<u64, u64>::with_fill_factor(300, 1.0).is_err());
    /// ```
    pub fn with_fill_factor(max_size: usize, fill_factor: f32) -> Result<Self, ConfigError> {
        Self::with_hasher(max_size, fill_factor, FxBuildHasher)
    }
}

impl<K, V, S> GenerationalCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    /// Creates a cache that hashes keys with `hasher`.
    pub fn with_hasher(max_size: usize, fill_factor: f32, hasher: S) -> Result<Self, ConfigError> {
        if max_size < MIN_SIZE {
            return Err(ConfigError::below_minimum("max size", max_size, MIN_SIZE));
        }
        let threshold = max_size / 3;
        // Room for `threshold` entries without growing before the rotation.
        let table = |hasher: S| OpenAddressingTable::with_hasher(threshold + 1, fill_factor, hasher);
        Ok(Self {
            current: table(hasher.clone())?,
            aging: table(hasher.clone())?,
            retiring: table(hasher)?,
            max_size,
            threshold,
        })
    }

    /// Returns the value for `key`.
    ///
    /// A hit in an older generation is copied into `current`, which may
    /// rotate the generations.
    pub fn get(&mut self, key: &K) -> Option<&V>
    where
        K: Clone,
        V: Clone,
    {
        if self.current.contains_key(key) {
            return self.current.get(key);
        }
        let value = self
            .aging
            .get(key)
            .or_else(|| self.retiring.get(key))
            .cloned()?;
        self.put(key.clone(), value);
        self.current.get(key)
    }

    /// Returns the freshest value for `key` without republishing it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.current
            .get(key)
            .or_else(|| self.aging.get(key))
            .or_else(|| self.retiring.get(key))
    }

    /// Returns `true` if any generation holds `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.current.contains_key(key)
            || self.aging.contains_key(key)
            || self.retiring.contains_key(key)
    }

    /// Writes `key` into the current generation, rotating first if it is full.
    ///
    /// Returns the value `key` had in the current generation only; older
    /// generations are not consulted, so a key living only in `aging` or
    /// `retiring` yields `None`. Those copies are left in place and age out.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.current.len() >= self.threshold {
            self.rotate();
        }
        self.current.put(key, value)
    }

    /// Removes `key` from every generation, returning the freshest value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let retiring = self.retiring.remove(key);
        let aging = self.aging.remove(key);
        let current = self.current.remove(key);
        current.or(aging).or(retiring)
    }

    /// Empties all three generations.
    pub fn clear(&mut self) {
        self.current.clear();
        self.aging.clear();
        self.retiring.clear();
        log::debug!("generational cache cleared (max size {})", self.max_size);
    }

    /// Sum of the three generation sizes; may count a key more than once.
    pub fn len(&self) -> usize {
        self.current.len() + self.aging.len() + self.retiring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Entries the current generation takes before a rotation (`max_size / 3`).
    pub fn generation_threshold(&self) -> usize {
        self.threshold
    }

    /// Sizes of `[current, aging, retiring]`.
    pub fn generation_lens(&self) -> [usize; 3] {
        [self.current.len(), self.aging.len(), self.retiring.len()]
    }

    fn rotate(&mut self) {
        log::debug!(
            "generational cache rotating: dropping {} entries, aging {}",
            self.retiring.len(),
            self.current.len()
        );
        self.retiring.clear();
        mem::swap(&mut self.aging, &mut self.retiring);
        mem::swap(&mut self.current, &mut self.aging);
    }
}

impl<K, V, S> CoreCache<K, V> for GenerationalCache<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        GenerationalCache::get(self, key).cloned()
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        GenerationalCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        GenerationalCache::remove(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        GenerationalCache::contains(self, key)
    }

    fn len(&self) -> usize {
        GenerationalCache::len(self)
    }

    fn clear(&mut self) {
        GenerationalCache::clear(self);
    }
}

impl<K, V, S> fmt::Debug for GenerationalCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationalCache")
            .field("max_size", &self.max_size)
            .field("threshold", &self.threshold)
            .field(
                "generation_lens",
                &[self.current.len(), self.aging.len(), self.retiring.len()],
            )
            .finish_non_exhaustive()
    }
}
