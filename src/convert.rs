//! Small numeric-cast helpers used throughout grid and table code.

/// Truncate a non-negative float to an index, clamping negatives to zero.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
pub fn usize_from_f64(x: f64) -> usize {
    x.max(0.0) as usize
}

/// Widen an index to `f64`.
///
/// # Panics
///
/// Panics if `x` does not fit in a `u32`.
pub fn f64_from_usize(x: usize) -> f64 {
    f64::from(u32::try_from(x).unwrap())
}
