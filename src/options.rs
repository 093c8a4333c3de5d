//! User-configurable physics options (§6), validated once at construction.
//!
//! Grounded on `original_source/src/celeritas/phys/PhysicsData.hh`'s
//! `PhysicsParamsScalars`/`ParticleScalars` validity predicates.

use crate::error::{Error, Result};

/// Which multiple-scattering step-limit algorithm a particle size class
/// uses (§4.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepLimitAlgorithm {
    /// Limit the step to a small fraction of the range; cheapest, least
    /// accurate near boundaries.
    Minimal,
    /// Shrink the step further within one radiation length of a boundary.
    Safety,
    /// `Safety`, plus an extra reduction based on the true-path/geometric
    /// path ratio.
    SafetyPlus,
}

/// Per-size-class (light/heavy) multiple-scattering and range options
/// (§4.3).
#[derive(Clone, Copy, Debug)]
pub struct ParticleClassOptions {
    /// `ρ`: below this range, no step scaling is applied.
    pub min_range: f64,
    /// `α`: the scaled step limiter's fractional range step.
    pub max_step_over_range: f64,
    /// Kinetic energy below which the particle is considered stopped for
    /// range purposes.
    pub lowest_energy: f64,
    /// Fractional step limit applied to the MSC range, in `(0, 1)`.
    pub range_factor: f64,
    /// Whether lateral displacement sampling is enabled.
    pub displaced: bool,
    /// Which step-limit algorithm this size class uses.
    pub step_limit_algorithm: StepLimitAlgorithm,
}

impl ParticleClassOptions {
    fn validate(&self, label: &str) -> Result<()> {
        if !(self.min_range > 0.0) {
            return Err(Error::general(format!("{label}.min_range must be positive")));
        }
        if !(self.max_step_over_range > 0.0) {
            return Err(Error::general(format!(
                "{label}.max_step_over_range must be positive"
            )));
        }
        if !(self.lowest_energy > 0.0) {
            return Err(Error::general(format!("{label}.lowest_energy must be positive")));
        }
        if !(self.range_factor > 0.0 && self.range_factor < 1.0) {
            return Err(Error::general(format!(
                "{label}.range_factor must lie in (0, 1)"
            )));
        }
        Ok(())
    }
}

/// Physics core configuration (§6): `{min_eprime_over_e, linear_loss_limit,
/// secondary_stack_factor, lambda_limit, safety_factor, spline_eloss_order,
/// disable_integral_xs, fixed_step_limiter, light, heavy}`.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsOptions {
    /// `ξ`: the integral-XS estimator's safety fraction, defaults to
    /// `1 - max_step_over_range`.
    pub min_eprime_over_e: f64,
    /// Above this fractional energy loss over a step, the range-based
    /// step estimate is no longer treated as linear.
    pub linear_loss_limit: f64,
    /// Secondary stack capacity, as a multiple of the track pool size.
    pub secondary_stack_factor: f64,
    /// MSC lambda limit.
    pub lambda_limit: f64,
    /// MSC safety factor; must be at least `0.1`.
    pub safety_factor: f64,
    /// Spline order used when building energy-loss interpolators (`≥ 1`).
    pub spline_eloss_order: usize,
    /// Disable the integral cross-section method and use the plain
    /// tabulated cross section at pre-step energy instead.
    pub disable_integral_xs: bool,
    /// A global charged-particle step size limit, if configured.
    pub fixed_step_limiter: Option<f64>,
    /// Options for light particles (electrons/positrons).
    pub light: ParticleClassOptions,
    /// Options for heavy particles (muons and above).
    pub heavy: ParticleClassOptions,
}

impl PhysicsOptions {
    /// Validate all bounds (§4.3, §4.6).
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated bound.
    pub fn new(
        min_eprime_over_e: f64,
        linear_loss_limit: f64,
        secondary_stack_factor: f64,
        lambda_limit: f64,
        safety_factor: f64,
        spline_eloss_order: usize,
        disable_integral_xs: bool,
        fixed_step_limiter: Option<f64>,
        light: ParticleClassOptions,
        heavy: ParticleClassOptions,
    ) -> Result<Self> {
        if !(min_eprime_over_e > 0.0) {
            return Err(Error::general("min_eprime_over_e must be positive"));
        }
        if !(linear_loss_limit > 0.0) {
            return Err(Error::general("linear_loss_limit must be positive"));
        }
        if !(secondary_stack_factor > 0.0) {
            return Err(Error::general("secondary_stack_factor must be positive"));
        }
        if !(lambda_limit > 0.0) {
            return Err(Error::general("lambda_limit must be positive"));
        }
        if safety_factor < 0.1 {
            return Err(Error::general("safety_factor must be at least 0.1"));
        }
        if spline_eloss_order < 1 {
            return Err(Error::general("spline_eloss_order must be at least 1"));
        }
        if let Some(limiter) = fixed_step_limiter {
            if !(limiter > 0.0) {
                return Err(Error::general(
                    "fixed_step_limiter must be positive when configured",
                ));
            }
        }
        light.validate("light")?;
        heavy.validate("heavy")?;

        Ok(Self {
            min_eprime_over_e,
            linear_loss_limit,
            secondary_stack_factor,
            lambda_limit,
            safety_factor,
            spline_eloss_order,
            disable_integral_xs,
            fixed_step_limiter,
            light,
            heavy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class() -> ParticleClassOptions {
        ParticleClassOptions {
            min_range: 0.1,
            max_step_over_range: 0.2,
            lowest_energy: 0.001,
            range_factor: 0.04,
            displaced: true,
            step_limit_algorithm: StepLimitAlgorithm::Safety,
        }
    }

    #[test]
    fn accepts_defaults() {
        let opts = PhysicsOptions::new(0.8, 0.01, 3.0, 1.0, 0.1, 1, false, None, class(), class());
        assert!(opts.is_ok());
    }

    #[test]
    fn rejects_low_safety_factor() {
        let err = PhysicsOptions::new(0.8, 0.01, 3.0, 1.0, 0.05, 1, false, None, class(), class());
        assert!(err.is_err());
    }

    #[test]
    fn rejects_range_factor_out_of_bounds() {
        let mut bad = class();
        bad.range_factor = 1.5;
        let err = PhysicsOptions::new(0.8, 0.01, 3.0, 1.0, 0.1, 1, false, None, bad, class());
        assert!(err.is_err());
    }

    #[test]
    fn rejects_nonpositive_fixed_step_limiter() {
        let err = PhysicsOptions::new(0.8, 0.01, 3.0, 1.0, 0.1, 1, false, Some(0.0), class(), class());
        assert!(err.is_err());
    }

    #[test]
    fn rejects_zero_spline_order() {
        let err = PhysicsOptions::new(0.8, 0.01, 3.0, 1.0, 0.1, 0, false, None, class(), class());
        assert!(err.is_err());
    }
}
