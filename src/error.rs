//! Error types for the lrukit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned by every fallible constructor when a size is
//!   below the variant's minimum, a fill factor lies outside `(0, 1)`, or the
//!   requested table would exceed 2^30 slots.
//! - [`InvariantError`]: Returned by `check_invariants` when slot accounting
//!   or probe reachability is broken.
//!
//! Keys and values are ordinary Rust values, so there is no error for null
//! arguments.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::error::ConfigError;
//! use lrukit::policy::clock::ClockEvictionCache;
//!
//! let cache: Result<ClockEvictionCache<String, i32>, ConfigError> =
//!     ClockEvictionCache::new(100);
//! assert!(cache.is_ok());
//!
//! // Below the minimum of 4 entries.
//! let bad = ClockEvictionCache::<String, i32>::new(3);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when construction parameters are invalid.
///
/// Carries a human-readable description of the rejected parameter. It is a
/// programming error on the caller's side and is never worth retrying with
/// the same arguments.
///
/// # Example
///
/// ```
/// use lrukit::policy::generational::GenerationalCache;
///
/// let err = GenerationalCache::<u64, u64>::new(9).unwrap_err();
/// assert!(err.to_string().contains("max size"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }

    pub(crate) fn below_minimum(what: &str, got: usize, min: usize) -> Self {
        Self(format!("{what} must be >= {min}, got {got}"))
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when a structural invariant does not hold.
///
/// Produced by `check_invariants` on the tables and caches, e.g.
/// [`ClockEvictionCache::check_invariants`](crate::policy::clock::ClockEvictionCache::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
