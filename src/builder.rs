//! Unified cache builder for every cache variant.
//!
//! Picks a variant at runtime from a [`CachePolicy`] and hides it behind one
//! [`Cache`] type, validating the configuration up front.
//!
//! ## Example
//!
//! ```rust
//! use lrukit::builder::{CacheBuilder, CachePolicy};
//!
//! let mut cache = CacheBuilder::new(1_000)
//!     .fill_factor(0.5)
//!     .build::<u64, String>(CachePolicy::Generational)
//!     .unwrap();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::ds::sizing::validate_fill_factor;
use crate::error::ConfigError;
use crate::policy::access_ordered::BoundedAccessOrderedCache;
use crate::policy::clock::ClockEvictionCache;
#[cfg(feature = "concurrency")]
use crate::policy::concurrent_generational::ConcurrentGenerationalCache;
use crate::policy::generational::GenerationalCache;
use crate::traits::CoreCache;

/// Fill factor used by [`CachePolicy::Generational`] when none is set.
pub const DEFAULT_FILL_FACTOR: f32 = 0.5;

/// Available cache variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Clock (second-chance) eviction over one open-addressed array.
    Clock,
    /// Three open-addressing generations, single-threaded.
    Generational,
    /// Three `DashMap` generations swapped atomically.
    #[cfg(feature = "concurrency")]
    ConcurrentGenerational,
    /// Exact LRU.
    AccessOrdered,
}

/// Cache wrapper with one API regardless of the chosen policy.
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    Clock(ClockEvictionCache<K, V>),
    Generational(GenerationalCache<K, V>),
    #[cfg(feature = "concurrency")]
    ConcurrentGenerational(ConcurrentGenerationalCache<K, V>),
    AccessOrdered(BoundedAccessOrderedCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Returns a clone of the value for `key`, recording the access.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match &mut self.inner {
            CacheInner::Clock(clock) => clock.get(key).cloned(),
            CacheInner::Generational(generational) => generational.get(key).cloned(),
            #[cfg(feature = "concurrency")]
            CacheInner::ConcurrentGenerational(concurrent) => concurrent.get(key),
            CacheInner::AccessOrdered(lru) => lru.get(key).cloned(),
        }
    }

    /// Stores `value` under `key`. Returns the previous value if the key existed.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.inner {
            CacheInner::Clock(clock) => clock.put(key, value),
            CacheInner::Generational(generational) => generational.put(key, value),
            #[cfg(feature = "concurrency")]
            CacheInner::ConcurrentGenerational(concurrent) => concurrent.put(key, value),
            CacheInner::AccessOrdered(lru) => lru.put(key, value),
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        match &mut self.inner {
            CacheInner::Clock(clock) => clock.remove(key),
            CacheInner::Generational(generational) => generational.remove(key),
            #[cfg(feature = "concurrency")]
            CacheInner::ConcurrentGenerational(concurrent) => concurrent.remove(key),
            CacheInner::AccessOrdered(lru) => lru.remove(key),
        }
    }

    /// Check if a key exists without recording an access.
    pub fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Clock(clock) => clock.contains(key),
            CacheInner::Generational(generational) => generational.contains(key),
            #[cfg(feature = "concurrency")]
            CacheInner::ConcurrentGenerational(concurrent) => concurrent.contains(key),
            CacheInner::AccessOrdered(lru) => lru.contains(key),
        }
    }

    /// Return the number of entries (an upper bound for generational policies).
    pub fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Clock(clock) => clock.len(),
            CacheInner::Generational(generational) => generational.len(),
            #[cfg(feature = "concurrency")]
            CacheInner::ConcurrentGenerational(concurrent) => concurrent.len(),
            CacheInner::AccessOrdered(lru) => lru.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the configured entry bound.
    pub fn max_size(&self) -> usize {
        match &self.inner {
            CacheInner::Clock(clock) => clock.max_size(),
            CacheInner::Generational(generational) => generational.max_size(),
            #[cfg(feature = "concurrency")]
            CacheInner::ConcurrentGenerational(concurrent) => concurrent.max_size(),
            CacheInner::AccessOrdered(lru) => lru.capacity(),
        }
    }

    /// Return the policy this cache was built with.
    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            CacheInner::Clock(_) => CachePolicy::Clock,
            CacheInner::Generational(_) => CachePolicy::Generational,
            #[cfg(feature = "concurrency")]
            CacheInner::ConcurrentGenerational(_) => CachePolicy::ConcurrentGenerational,
            CacheInner::AccessOrdered(_) => CachePolicy::AccessOrdered,
        }
    }

    pub fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::Clock(clock) => clock.clear(),
            CacheInner::Generational(generational) => generational.clear(),
            #[cfg(feature = "concurrency")]
            CacheInner::ConcurrentGenerational(concurrent) => concurrent.clear(),
            CacheInner::AccessOrdered(lru) => lru.clear(),
        }
    }
}

impl<K, V> CoreCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        Cache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        Cache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        Cache::remove(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        Cache::contains(self, key)
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }

    fn clear(&mut self) {
        Cache::clear(self);
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy())
            .field("len", &self.len())
            .field("max_size", &self.max_size())
            .finish()
    }
}

/// Builder for creating cache instances.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    max_size: usize,
    fill_factor: f32,
}

impl CacheBuilder {
    /// Create a new cache builder bounded to `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            fill_factor: DEFAULT_FILL_FACTOR,
        }
    }

    /// Set the fill factor of the open-addressing tables.
    ///
    /// Only [`CachePolicy::Generational`] stores entries in tables with a
    /// configurable fill factor; the value is still validated for every policy.
    pub fn fill_factor(mut self, fill_factor: f32) -> Self {
        self.fill_factor = fill_factor;
        self
    }

    /// Build a cache with the specified policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the fill factor is outside `(0, 1)` or
    /// `max_size` is below the chosen policy's minimum (4 for clock, 10 for
    /// the generational policies, 1 for access-ordered).
    ///
    /// # Example
    ///
    /// ```rust
    /// use lrukit::builder::{CacheBuilder, CachePolicy};
    ///
    /// let clock = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Clock);
    /// assert!(clock.is_ok());
    ///
    /// let too_small = CacheBuilder::new(5).build::<u64, String>(CachePolicy::Generational);
    /// assert!(too_small.is_err());
    ///
    /// let bad_fill = CacheBuilder::new(100)
    ///     .fill_factor(1.5)
    ///     .build::<u64, String>(CachePolicy::AccessOrdered);
    /// assert!(bad_fill.is_err());
    /// ```
    pub fn build<K, V>(self, policy: CachePolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        validate_fill_factor(self.fill_factor)?;
        let inner = match policy {
            CachePolicy::Clock => CacheInner::Clock(ClockEvictionCache::new(self.max_size)?),
            CachePolicy::Generational => CacheInner::Generational(
                GenerationalCache::with_fill_factor(self.max_size, self.fill_factor)?,
            ),
            #[cfg(feature = "concurrency")]
            CachePolicy::ConcurrentGenerational => CacheInner::ConcurrentGenerational(
                ConcurrentGenerationalCache::new(self.max_size)?,
            ),
            CachePolicy::AccessOrdered => {
                CacheInner::AccessOrdered(BoundedAccessOrderedCache::new(self.max_size)?)
            },
        };

        Ok(Cache { inner })
    }
}
