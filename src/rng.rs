//! `U(0,1)` canonical generation and exponential sampling built on top of
//! the external [`RngEngine`](crate::interfaces::RngEngine) (§6.4).
//!
//! Grounded on `original_source/src/corecel/random/distribution/
//! {GenerateCanonical,ExponentialDistribution}.hh`: the core never owns a
//! concrete RNG, only this thin layer of canonical/exponential draws on top
//! of `next_u32`.

use crate::interfaces::RngEngine;

/// Draw `u ~ U(0, 1)` from the raw 32-bit stream.
#[must_use]
pub fn generate_canonical(rng: &mut impl RngEngine) -> f64 {
    f64::from(rng.next_u32()) / (f64::from(u32::MAX) + 1.0)
}

/// Draw from `Exponential(lambda = 1)` via inverse-CDF sampling:
/// `-ln(1 - u)`.
#[must_use]
pub fn sample_exponential(rng: &mut impl RngEngine) -> f64 {
    -(1.0 - generate_canonical(rng)).ln()
}
