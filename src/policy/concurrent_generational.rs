//! Thread-safe generational cache with lock-free generation swaps.
//!
//! The same three-generation rotation as
//! [`GenerationalCache`](crate::policy::generational::GenerationalCache), over
//! [`DashMap`]s. The generation triple is immutable once built and published
//! through an [`ArcSwap`]; rotating means building a new triple and storing
//! it with one atomic swap. Readers always see a complete triple.
//!
//! ## Architecture
//!
//! ```text
//!   view: ArcSwap<Generations>
//!        │
//!        │ load()                               store(new triple)
//!        ▼                                           │
//!   ┌───────────────────────────── Generations ──────┼─────────────┐
//!   │  current: Arc<DashMap>  aging: Arc<DashMap>  retiring: Arc<DashMap>
//!   └──────────────────────────────────────────────────────────────┘
//!
//!   rotate: { new empty, old current, old aging }  (old retiring dropped
//!           when the last reader releases the old triple)
//! ```
//!
//! ## Consistency
//!
//! - Every operation loads the view once and works against that triple.
//! - Two writers that both find `current` full each publish a fresh triple;
//!   the later store wins and the other writer's entry is lost. This only
//!   costs a cache miss.
//! - There is no read-your-writes guarantee across threads.
//! - [`len`](ConcurrentGenerationalCache::len) sums the three maps and
//!   over-counts keys present in more than one generation.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use lrukit::policy::concurrent_generational::ConcurrentGenerationalCache;
//!
//! let cache = Arc::new(ConcurrentGenerationalCache::new(1_000).unwrap());
//! let workers: Vec<_> = (0..4u64)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..100u64 {
//!                 cache.put(t * 1_000 + i, i);
//!             }
//!         })
//!     })
//!     .collect();
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//!
//! assert_eq!(cache.get(&3_042), Some(42));
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use crate::error::ConfigError;
use crate::policy::generational::MIN_SIZE;
use crate::traits::{ConcurrentCache, CoreCache};

struct Generations<K, V, S> {
    current: Arc<DashMap<K, V, S>>,
    aging: Arc<DashMap<K, V, S>>,
    retiring: Arc<DashMap<K, V, S>>,
}

impl<K, V, S> Generations<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    fn empty(threshold: usize, hasher: &S) -> Self {
        Self {
            current: Arc::new(generation_map(threshold, hasher)),
            aging: Arc::new(generation_map(threshold, hasher)),
            retiring: Arc::new(generation_map(threshold, hasher)),
        }
    }
}

fn generation_map<K, V, S>(threshold: usize, hasher: &S) -> DashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    DashMap::with_capacity_and_hasher(2 * threshold + 1, hasher.clone())
}

/// Three-generation approximate LRU cache shared across threads.
///
/// All operations take `&self`. Values are returned by clone; store
/// `Arc<T>` for values that are expensive to copy.
pub struct ConcurrentGenerationalCache<K, V, S = FxBuildHasher> {
    view: ArcSwap<Generations<K, V, S>>,
    max_size: usize,
    threshold: usize,
    hasher: S,
}

impl<K, V> ConcurrentGenerationalCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates a cache bounded to roughly `max_size` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `max_size` is below [`MIN_SIZE`].
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::concurrent_generational::ConcurrentGenerationalCache;
    ///
    /// let cache: ConcurrentGenerationalCache<u64, u64> =
    ///     ConcurrentGenerationalCache::new(12).unwrap();
    /// assert_eq!(cache.generation_threshold(), 4);
    ///
    /// assert!(ConcurrentGenerationalCache::<u64, u64>::new(9).is_err());
    /// ```
    pub fn new(max_size: usize) -> Result<Self, ConfigError> {
        Self::with_hasher(max_size, FxBuildHasher)
    }
}

impl<K, V, S> ConcurrentGenerationalCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    /// Creates a cache whose maps hash keys with `hasher`.
    pub fn with_hasher(max_size: usize, hasher: S) -> Result<Self, ConfigError> {
        if max_size < MIN_SIZE {
            return Err(ConfigError::below_minimum("max size", max_size, MIN_SIZE));
        }
        let threshold = max_size / 3;
        Ok(Self {
            view: ArcSwap::from_pointee(Generations::empty(threshold, &hasher)),
            max_size,
            threshold,
            hasher,
        })
    }

    /// Returns a clone of the value for `key`.
    ///
    /// A hit in an older generation is written back into the current one.
    pub fn get(&self, key: &K) -> Option<V>
    where
        K: Clone,
        V: Clone,
    {
        let view = self.view.load();
        if let Some(hit) = view.current.get(key) {
            return Some(hit.value().clone());
        }
        let value = view
            .aging
            .get(key)
            .map(|hit| hit.value().clone())
            .or_else(|| view.retiring.get(key).map(|hit| hit.value().clone()))?;
        drop(view);

        self.put(key.clone(), value.clone());
        Some(value)
    }

    /// Returns `true` if any generation holds `key`. Never republishes.
    pub fn contains(&self, key: &K) -> bool {
        let view = self.view.load();
        view.current.contains_key(key)
            || view.aging.contains_key(key)
            || view.retiring.contains_key(key)
    }

    /// Writes `key` into the current generation, rotating first if it is full.
    ///
    /// Returns the previous value in the map that received the write. Older
    /// generations are not consulted, so a key living only in `aging` or
    /// `retiring` yields `None`; those copies age out.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let view = self.view.load();
        if view.current.len() < self.threshold {
            return view.current.insert(key, value);
        }

        log::debug!(
            "concurrent generational cache rotating: dropping {} entries, aging {}",
            view.retiring.len(),
            view.current.len()
        );
        self.view.store(Arc::new(Generations {
            current: Arc::new(generation_map(self.threshold, &self.hasher)),
            aging: Arc::clone(&view.current),
            retiring: Arc::clone(&view.aging),
        }));
        drop(view);

        self.view.load().current.insert(key, value)
    }

    /// Removes `key` from every generation, returning the freshest value.
    pub fn remove(&self, key: &K) -> Option<V> {
        let view = self.view.load();
        let retiring = view.retiring.remove(key).map(|(_, v)| v);
        let aging = view.aging.remove(key).map(|(_, v)| v);
        let current = view.current.remove(key).map(|(_, v)| v);
        current.or(aging).or(retiring)
    }

    /// Publishes an empty generation triple.
    pub fn clear(&self) {
        self.view
            .store(Arc::new(Generations::empty(self.threshold, &self.hasher)));
        log::debug!(
            "concurrent generational cache cleared (max size {})",
            self.max_size
        );
    }

    /// Sum of the three generation sizes; may count a key more than once.
    pub fn len(&self) -> usize {
        let [current, aging, retiring] = self.generation_lens();
        current + aging + retiring
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

    /// Sizes of `[current, aging, retiring]` in one loaded view.
    pub fn generation_lens(&self) -> [usize; 3] {
        let view = self.view.load();
        [view.current.len(), view.aging.len(), view.retiring.len()]
    }

}

impl<K, V, S> CoreCache<K, V> for ConcurrentGenerationalCache<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        ConcurrentGenerationalCache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        ConcurrentGenerationalCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        ConcurrentGenerationalCache::remove(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        ConcurrentGenerationalCache::contains(self, key)
    }

    fn len(&self) -> usize {
        ConcurrentGenerationalCache::len(self)
    }

    fn clear(&mut self) {
        ConcurrentGenerationalCache::clear(self);
    }
}

impl<K, V, S> ConcurrentCache for ConcurrentGenerationalCache<K, V, S>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
    S: BuildHasher + Clone + Send + Sync,
{
}

impl<K, V, S> fmt::Debug for ConcurrentGenerationalCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentGenerationalCache")
            .field("max_size", &self.max_size)
            .field("threshold", &self.threshold)
            .field("generation_lens", &self.generation_lens())
            .finish_non_exhaustive()
    }
}
