//! Table sizing and hash mixing shared by the open-addressed tables.
//!
//! Every table in this crate is a flat slot array whose length is a power of
//! two, so a hash is turned into a slot index with `hash & mask`. The helpers
//! here compute that length from an expected element count and a fill factor
//! and spread the hash bits before masking.

use std::hash::{BuildHasher, Hash};

use crate::error::ConfigError;

/// Largest slot array any table will allocate (2^30 slots).
pub const MAX_TABLE_CAPACITY: usize = 1 << 30;

/// Returns the least power of two greater than or equal to `x`.
///
/// Returns 1 for 0. Saturates at `2^63` instead of overflowing.
#[inline]
pub fn next_power_of_two(x: u64) -> u64 {
    x.checked_next_power_of_two().unwrap_or(1 << 63)
}

/// Returns the slot-array length for `expected` elements at `fill_factor`.
///
/// The result is the least power of two `>= ceil(expected / fill_factor)`,
/// never smaller than 2.
///
/// # Errors
///
/// Returns [`ConfigError`] when the fill factor is outside `(0, 1)` or the
/// required length exceeds [`MAX_TABLE_CAPACITY`].
///
/// # Example
///
/// ```
/// use lrukit::ds::sizing::array_size;
///
/// assert_eq!(array_size(16, 0.5).unwrap(), 32);
/// assert_eq!(array_size(3, 0.75).unwrap(), 4);
/// assert!(array_size(1 << 30, 0.5).is_err());
/// ```
pub fn array_size(expected: usize, fill_factor: f32) -> Result<usize, ConfigError> {
    validate_fill_factor(fill_factor)?;
    let needed = (expected as f64 / f64::from(fill_factor)).ceil();
    if needed > MAX_TABLE_CAPACITY as f64 {
        return Err(ConfigError::new(format!(
            "table too large ({expected} expected elements with fill factor {fill_factor})"
        )));
    }
    let size = next_power_of_two(needed as u64).max(2);
    if size > MAX_TABLE_CAPACITY as u64 {
        return Err(ConfigError::new(format!(
            "table too large ({expected} expected elements with fill factor {fill_factor})"
        )));
    }
    Ok(size as usize)
}

/// Rejects fill factors outside the open interval `(0, 1)`, including NaN.
pub fn validate_fill_factor(fill_factor: f32) -> Result<(), ConfigError> {
    if fill_factor > 0.0 && fill_factor < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::new(format!(
            "fill factor must be in (0, 1), got {fill_factor}"
        )))
    }
}

/// Spreads high hash bits into the low bits that the slot mask keeps.
///
/// Folds the upper half into the lower half, then applies `h ^ (h >> 16)`.
#[inline]
pub fn mix_hash(hash: u64) -> u64 {
    let h = hash ^ (hash >> 32);
    h ^ (h >> 16)
}

/// Hashes `key` with `hasher` and returns its home slot for `mask`.
#[inline]
pub(crate) fn home_slot<K, S>(hasher: &S, key: &K, mask: usize) -> usize
where
    K: Hash + ?Sized,
    S: BuildHasher,
{
    (mix_hash(hasher.hash_one(key)) as usize) & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_power_of_two_rounds_up() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(2), 2);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(1000), 1024);
        assert_eq!(next_power_of_two(1024), 1024);
        assert_eq!(next_power_of_two(u64::MAX), 1 << 63);
    }

    #[test]
    fn array_size_respects_fill_factor() {
        assert_eq!(array_size(16, 0.5).unwrap(), 32);
        assert_eq!(array_size(13, 0.5).unwrap(), 32);
        assert_eq!(array_size(4, 1.0 / 3.0).unwrap(), 16);
        assert_eq!(array_size(10, 0.9).unwrap(), 16);
    }

    #[test]
    fn array_size_has_floor_of_two() {
        assert_eq!(array_size(0, 0.5).unwrap(), 2);
        assert_eq!(array_size(1, 0.9).unwrap(), 2);
    }

    #[test]
    fn array_size_caps_at_max_capacity() {
        assert_eq!(array_size(1 << 29, 0.5).unwrap(), MAX_TABLE_CAPACITY);
        let err = array_size((1 << 29) + 1, 0.5).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn fill_factor_bounds_are_exclusive() {
        assert!(validate_fill_factor(0.0).is_err());
        assert!(validate_fill_factor(1.0).is_err());
        assert!(validate_fill_factor(-0.5).is_err());
        assert!(validate_fill_factor(f32::NAN).is_err());
        assert!(validate_fill_factor(0.01).is_ok());
        assert!(validate_fill_factor(0.99).is_ok());
    }

    #[test]
    fn mix_hash_folds_high_bits() {
        // Two hashes that differ only above bit 32 must land on different
        // low bits after mixing.
        let a = mix_hash(1u64 << 40);
        let b = mix_hash(1u64 << 41);
        assert_ne!(a & 0xFFFF, b & 0xFFFF);
        assert_eq!(mix_hash(0), 0);
    }
}
