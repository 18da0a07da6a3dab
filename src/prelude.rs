pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::ds::{IntrusiveList, OpenAddressingTable, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "concurrency")]
pub use crate::policy::access_ordered::ConcurrentBoundedAccessOrderedCache;
pub use crate::policy::access_ordered::BoundedAccessOrderedCache;
pub use crate::policy::bounded_list::BoundedList;
pub use crate::policy::clock::ClockEvictionCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::concurrent_generational::ConcurrentGenerationalCache;
pub use crate::policy::generational::GenerationalCache;
pub use crate::traits::{ConcurrentCache, CoreCache};
