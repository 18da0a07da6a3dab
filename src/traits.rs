//! # Cache Capability Traits
//!
//! Every cache in this crate offers the same six operations: `get`, `put`,
//! `remove`, `contains`, `clear` and `len`. [`CoreCache`] names that surface
//! so callers, benches and the builder's [`Cache`](crate::builder::Cache) can
//! be written once against any variant.
//!
//! ## Architecture
//!
//! ```text
//!                      ┌─────────────────────────────────────────┐
//!                      │            CoreCache<K, V>              │
//!                      │                                         │
//!                      │  get(&mut, &K) → Option<V>              │
//!                      │  put(&mut, K, V) → Option<V>            │
//!                      │  remove(&mut, &K) → Option<V>           │
//!                      │  contains(&, &K) → bool                 │
//!                      │  len(&) → usize                         │
//!                      │  is_empty(&) → bool                     │
//!                      │  clear(&mut)                            │
//!                      └──────────────────┬──────────────────────┘
//!                                         │
//!        ┌──────────────────┬─────────────┴──────┬──────────────────────────┐
//!        ▼                  ▼                    ▼                          ▼
//!   ClockEviction     Generational      ConcurrentGenerational     BoundedAccessOrdered
//!   (approx. LRU)     (approx. LRU)     (+ ConcurrentCache)        (exact LRU)
//! ```
//!
//! ## Owned Values
//!
//! [`CoreCache::get`] returns an owned clone. The concurrent variant cannot
//! hand out a reference into a map another thread may rotate away, so the
//! single-threaded variants clone too when called through the trait. Their
//! inherent `get` methods still return references. Store `Arc<T>` when values
//! are expensive to clone.
//!
//! ## Thread Safety
//!
//! - Single-threaded variants mutate through `&mut self`; share them with a
//!   lock or use the concurrent variants.
//! - [`ConcurrentCache`] marks the variants whose inherent methods take
//!   `&self` and are safe to call from many threads at once.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::policy::clock::ClockEvictionCache;
//! use lrukit::traits::CoreCache;
//!
//! fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
//!     for (key, value) in data {
//!         cache.put(*key, value.clone());
//!     }
//! }
//!
//! let mut cache = ClockEvictionCache::new(16).unwrap();
//! warm(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
//! assert_eq!(CoreCache::get(&mut cache, &1), Some("one".to_string()));
//! assert_eq!(CoreCache::len(&cache), 2);
//! ```

/// Operations shared by every bounded cache in the crate.
///
/// # Type Parameters
///
/// - `K`: Key type (implementations require `Eq + Hash`)
/// - `V`: Value type, cloned out by [`get`](Self::get)
pub trait CoreCache<K, V> {
    /// Returns a clone of the value for `key`, recording the access.
    ///
    /// How the access is recorded depends on the variant: the clock cache
    /// sets the slot's reference bit, the generational caches republish the
    /// entry into the newest generation, the access-ordered cache moves it to
    /// the front.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::generational::GenerationalCache;
    /// use lrukit::traits::CoreCache;
    ///
    /// let mut cache = GenerationalCache::new(30).unwrap();
    /// CoreCache::put(&mut cache, 1, "value");
    ///
    /// assert_eq!(CoreCache::get(&mut cache, &1), Some("value"));
    /// assert_eq!(CoreCache::get(&mut cache, &99), None);
    /// ```
    fn get(&mut self, key: &K) -> Option<V>;

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// May evict another entry to stay within the configured bound.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Removes `key`, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Checks membership without recording an access.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of stored entries.
    ///
    /// Exact for the clock and access-ordered caches. The generational
    /// caches may count a key once per generation that holds it.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::access_ordered::BoundedAccessOrderedCache;
    /// use lrukit::traits::CoreCache;
    ///
    /// let mut cache = BoundedAccessOrderedCache::new(10).unwrap();
    /// CoreCache::put(&mut cache, 1, "one");
    /// CoreCache::put(&mut cache, 2, "two");
    ///
    /// CoreCache::clear(&mut cache);
    /// assert!(CoreCache::is_empty(&cache));
    /// ```
    fn clear(&mut self);
}

/// Marker trait for caches that are safe to share across threads.
///
/// Implemented by the variants whose inherent operations take `&self`:
/// [`ConcurrentGenerationalCache`](crate::policy::concurrent_generational::ConcurrentGenerationalCache)
/// and
/// [`ConcurrentBoundedAccessOrderedCache`](crate::policy::access_ordered::ConcurrentBoundedAccessOrderedCache).
///
/// ```
/// # #[cfg(feature = "concurrency")]
/// # {
/// use std::sync::Arc;
/// use lrukit::policy::concurrent_generational::ConcurrentGenerationalCache;
/// use lrukit::traits::ConcurrentCache;
///
/// fn share<C: ConcurrentCache + 'static>(cache: C) -> Arc<C> {
///     Arc::new(cache)
/// }
///
/// let cache = share(ConcurrentGenerationalCache::<u64, u64>::new(30).unwrap());
/// let handle = {
///     let cache = Arc::clone(&cache);
///     std::thread::spawn(move || cache.put(1, 10))
/// };
/// handle.join().unwrap();
/// assert_eq!(cache.get(&1), Some(10));
/// # }
/// ```
pub trait ConcurrentCache: Send + Sync {}
