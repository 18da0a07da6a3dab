//! Cache variants.
//!
//! - [`clock`]: second-chance eviction in one open-addressed array.
//! - [`generational`]: three rotating open-addressing tables.
//! - `concurrent_generational`: the same rotation over `DashMap`s, shared
//!   through `ArcSwap` (`concurrency` feature).
//! - [`access_ordered`]: exact LRU, the baseline the others approximate.
//! - [`bounded_list`]: fixed-capacity FIFO sequence.

pub mod access_ordered;
pub mod bounded_list;
pub mod clock;
#[cfg(feature = "concurrency")]
pub mod concurrent_generational;
pub mod generational;
