//! Building blocks shared by the cache variants.

pub mod intrusive_list;
pub mod open_addressing;
pub mod sizing;
pub mod slot_arena;

pub use intrusive_list::IntrusiveList;
pub use open_addressing::OpenAddressingTable;
pub use slot_arena::{SlotArena, SlotId};
