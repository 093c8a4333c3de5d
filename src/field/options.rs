//! Tunables for the field substepper (§4.2, §6).
//!
//! Grounded on the options consumed by
//! `original_source/src/celeritas/field/FieldSubstepper.hh`
//! (`FieldDriverOptions.hh` itself wasn't among the retrieved sources, so
//! the field set and defaults below follow the substepper's usage sites
//! directly; defaults are conservative engineering judgment calls recorded
//! in `DESIGN.md`).

use crate::error::{Error, Result};

/// Configuration for the adaptive field substepper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldDriverOptions {
    /// Maximum sagitta (miss distance) allowed between a curved step and
    /// its chord.
    pub delta_chord: f64,
    /// Tolerance added to `delta_chord` when accepting a boundary crossing.
    pub delta_intersection: f64,
    /// Maximum relative error per integration step.
    pub epsilon_rel_max: f64,
    /// Below this trial step length, take a single "quick advance" step
    /// instead of adaptive control.
    pub minimum_step: f64,
    /// Minimum shrink factor applied when a sagitta-bound retry is needed.
    pub min_chord_shrink: f64,
    /// Safety factor applied to the proposed next step size.
    pub safety: f64,
    /// Exponent used to shrink the step when the error is too large.
    pub pshrink: f64,
    /// Exponent used to grow the step when the error has margin.
    pub pgrow: f64,
    /// Maximum fractional decrease applied to a step in one retry.
    pub max_stepping_decrease: f64,
    /// Maximum fractional increase applied to a proposed next step.
    pub max_stepping_increase: f64,
    /// Maximum unsuccessful attempts per adaptive loop.
    pub max_nsteps: u32,
    /// Maximum substeps per `propagate` call.
    pub max_substeps: u32,
    /// Fraction of the requested step below which an external seed step is
    /// used to bootstrap `accurate_advance`.
    pub initial_step_tol: f64,
    /// Fraction of the step used as the minimum-progress threshold inside
    /// `accurate_advance`.
    pub epsilon_step: f64,
    /// Additional tolerance added to `delta_chord` in the sagitta check.
    pub dchord_tol: f64,
}

impl Default for FieldDriverOptions {
    fn default() -> Self {
        Self {
            delta_chord: 0.25,
            delta_intersection: 1e-4,
            epsilon_rel_max: 1e-3,
            minimum_step: 1e-5,
            min_chord_shrink: 0.7,
            safety: 0.9,
            pshrink: -0.2,
            pgrow: -0.25,
            max_stepping_decrease: 0.1,
            max_stepping_increase: 5.0,
            max_nsteps: 100,
            max_substeps: 100,
            initial_step_tol: 1e-6,
            epsilon_step: 1e-6,
            dchord_tol: 1e-10,
        }
    }
}

impl FieldDriverOptions {
    /// Validate option bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if any tunable is out of the range the substepper
    /// assumes (positive distances/steps, shrink/grow factors in `(0, 1)`
    /// or `> 1` as appropriate).
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("delta_chord", self.delta_chord),
            ("epsilon_rel_max", self.epsilon_rel_max),
            ("minimum_step", self.minimum_step),
            ("safety", self.safety),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(Error::general(format!("{name} must be positive, got {value}")));
            }
        }
        if !(0.0 < self.min_chord_shrink && self.min_chord_shrink < 1.0) {
            return Err(Error::general("min_chord_shrink must be in (0, 1)"));
        }
        if !(0.0 < self.max_stepping_decrease && self.max_stepping_decrease < 1.0) {
            return Err(Error::general("max_stepping_decrease must be in (0, 1)"));
        }
        if !(self.max_stepping_increase > 1.0) {
            return Err(Error::general("max_stepping_increase must be > 1"));
        }
        if self.max_nsteps == 0 || self.max_substeps == 0 {
            return Err(Error::general("max_nsteps and max_substeps must be nonzero"));
        }
        Ok(())
    }
}
