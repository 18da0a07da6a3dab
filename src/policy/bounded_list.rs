//! Fixed-capacity FIFO sequence.
//!
//! Keeps the newest `capacity` items in insertion order. Pushing onto a full
//! list evicts and returns the oldest item. Backed by a `VecDeque`, so every
//! operation except [`BoundedList::contains`] is O(1).
//!
//! ```
//! use lrukit::policy::bounded_list::BoundedList;
//!
//! let mut recent = BoundedList::new(3).unwrap();
//! for host in ["a.example", "b.example", "c.example"] {
//!     assert_eq!(recent.push(host), None);
//! }
//! assert_eq!(recent.push("d.example"), Some("a.example"));
//! assert_eq!(recent.oldest(), Some(&"b.example"));
//! assert_eq!(recent.newest(), Some(&"d.example"));
//! ```

use std::collections::VecDeque;

use crate::error::ConfigError;

/// Bounded first-in first-out list.
#[derive(Debug, Clone)]
pub struct BoundedList<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedList<T> {
    /// Creates a list holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::below_minimum("capacity", capacity, 1));
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Appends `item`, returning the evicted oldest item if the list was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn pop_oldest(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Returns the item at `index`, counting from the oldest (0).
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Linear scan for `item`.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
