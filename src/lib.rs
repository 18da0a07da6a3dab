//! lrukit: bounded key-value caches that approximate LRU eviction.
//!
//! Each variant trades recency precision for throughput differently:
//!
//! | Type | Eviction | Sharing |
//! |------|----------|---------|
//! | [`ClockEvictionCache`](policy::clock::ClockEvictionCache) | second-chance sweep | `&mut self` |
//! | [`GenerationalCache`](policy::generational::GenerationalCache) | drop oldest of three tables | `&mut self` |
//! | `ConcurrentGenerationalCache` | drop oldest of three maps, atomic swap | `&self`, `Send + Sync` |
//! | [`BoundedAccessOrderedCache`](policy::access_ordered::BoundedAccessOrderedCache) | exact LRU | `&mut self` |
//! | [`BoundedList`](policy::bounded_list::BoundedList) | FIFO | `&mut self` |
//!
//! [`OpenAddressingTable`](ds::OpenAddressingTable) is the hash table under
//! the single-threaded generational cache and is usable on its own.
//!
//! All caches share the [`CoreCache`](traits::CoreCache) surface; the
//! [`builder`] picks one at runtime. Thread-safe variants live behind the
//! `concurrency` feature (on by default).
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::error::{ConfigError, InvariantError};
