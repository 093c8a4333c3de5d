//! The adaptive substepper: sagitta-bound chord search plus relative-error
//! controlled accurate advance (§4.2).
//!
//! Grounded directly on
//! `original_source/src/celeritas/field/FieldSubstepper.hh`; the control
//! flow, retry/shrink factors, and budget checks below mirror that file
//! line for line.

use std::cell::Cell;

use super::integrators::Integrator;
use super::options::FieldDriverOptions;
use super::types::{FieldIntegration, OdeState, Substep};
use super::util::{distance_chord, rel_err_sq};

struct ChordSearch {
    end: Substep,
    err_sq: f64,
}

struct Integration {
    end: Substep,
    proposed_length: f64,
}

/// Advances an [`OdeState`] by a single substep within the tolerances of a
/// [`FieldDriverOptions`], caching the accepted chord length between calls.
pub struct FieldSubstepper<I> {
    options: FieldDriverOptions,
    integrate: I,
    max_chord: Cell<f64>,
}

impl<I: Integrator> FieldSubstepper<I> {
    /// Construct from driver options and an integrator.
    #[must_use]
    pub fn new(options: FieldDriverOptions, integrate: I) -> Self {
        Self {
            options,
            integrate,
            max_chord: Cell::new(f64::INFINITY),
        }
    }

    /// The driver options this substepper was constructed with.
    #[must_use]
    pub const fn options(&self) -> FieldDriverOptions {
        self.options
    }

    /// For a given trial step, advance by a substep within tolerance.
    pub fn substep(&self, step: f64, state: &OdeState) -> Substep {
        if step <= self.options.minimum_step {
            let integrated = self.integrate.integrate(step, state);
            return Substep {
                state: integrated.end_state,
                length: step,
            };
        }

        let mut next = self.find_next_chord(step.min(self.max_chord.get()), state);
        debug_assert!(next.end.length <= step);
        if next.end.length < step {
            self.max_chord
                .set(next.end.length / self.options.min_chord_shrink);
        }

        if next.err_sq > 1.0 {
            let next_step = step * self.new_step_scale(next.err_sq);
            next.end = self.accurate_advance(next.end.length, state, next_step);
        }

        debug_assert!(next.end.length > 0.0 && next.end.length <= step);
        next.end
    }

    fn find_next_chord(&self, mut step: f64, state: &OdeState) -> ChordSearch {
        let mut succeeded = false;
        let mut remaining = self.options.max_nsteps;
        let mut integrated;

        loop {
            integrated = self.integrate.integrate(step, state);
            let dchord =
                distance_chord(state.pos, integrated.mid_state.pos, integrated.end_state.pos);

            if dchord > self.options.delta_chord + self.options.dchord_tol {
                let scale = (self.options.delta_chord / dchord)
                    .sqrt()
                    .max(self.options.min_chord_shrink);
                step *= scale;
            } else {
                succeeded = true;
            }
            remaining -= 1;
            if succeeded || remaining == 0 {
                break;
            }
        }

        ChordSearch {
            end: Substep {
                state: integrated.end_state,
                length: step,
            },
            err_sq: rel_err_sq(&integrated.err_state, step, state.mom)
                / self.options.epsilon_rel_max.powi(2),
        }
    }

    fn accurate_advance(&self, step: f64, state: &OdeState, hinitial: f64) -> Substep {
        debug_assert!(step > 0.0);
        let end_curve_length = step;

        let mut h = if hinitial > self.options.initial_step_tol * step && hinitial < step {
            hinitial
        } else {
            step
        };
        let h_threshold = self.options.epsilon_step * step;

        let mut result = Integration {
            end: Substep {
                state: *state,
                length: 0.0,
            },
            proposed_length: 0.0,
        };

        let mut succeeded = false;
        let mut curve_length = 0.0;
        let mut remaining = self.options.max_nsteps;

        while !succeeded && remaining > 0 {
            debug_assert!(h > 0.0);
            result = self.integrate_step(h, &result.end.state);
            curve_length += result.end.length;

            if h < h_threshold || curve_length >= end_curve_length {
                succeeded = true;
            } else {
                h = result
                    .proposed_length
                    .max(self.options.minimum_step)
                    .min(end_curve_length - curve_length);
            }
            remaining -= 1;
        }

        debug_assert!(curve_length > 0.0);
        Substep {
            state: result.end.state,
            length: curve_length.min(step),
        }
    }

    fn integrate_step(&self, step: f64, state: &OdeState) -> Integration {
        debug_assert!(step > 0.0);
        if step > self.options.minimum_step {
            self.one_good_step(step, state)
        } else {
            let integrated = self.integrate.integrate(step, state);
            let err_sq = rel_err_sq(&integrated.err_state, step, state.mom)
                / self.options.epsilon_rel_max.powi(2);
            Integration {
                end: Substep {
                    state: integrated.end_state,
                    length: step,
                },
                proposed_length: step * self.new_step_scale(err_sq),
            }
        }
    }

    fn one_good_step(&self, mut step: f64, state: &OdeState) -> Integration {
        let mut succeeded = false;
        let mut remaining = self.options.max_nsteps;
        let mut err_sq;
        let mut integrated: FieldIntegration;

        loop {
            integrated = self.integrate.integrate(step, state);
            err_sq = rel_err_sq(&integrated.err_state, step, state.mom)
                / self.options.epsilon_rel_max.powi(2);

            if err_sq > 1.0 {
                step *= self
                    .new_step_scale(err_sq)
                    .max(self.options.max_stepping_decrease);
            } else {
                succeeded = true;
            }
            remaining -= 1;
            if succeeded || remaining == 0 {
                break;
            }
        }

        Integration {
            end: Substep {
                state: integrated.end_state,
                length: step,
            },
            proposed_length: step
                * self
                    .new_step_scale(err_sq)
                    .min(self.options.max_stepping_increase),
        }
    }

    fn new_step_scale(&self, err_sq: f64) -> f64 {
        debug_assert!(err_sq >= 0.0);
        let exponent = 0.5 * if err_sq > 1.0 {
            self.options.pshrink
        } else {
            self.options.pgrow
        };
        self.options.safety * err_sq.powf(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::equation::{MagFieldEquation, UniformZField};
    use crate::field::integrators::ZHelixIntegrator;

    #[test]
    fn substep_never_exceeds_request() {
        let eq = MagFieldEquation::new(UniformZField::new(1.0), -1.0);
        let integrator = ZHelixIntegrator::new(eq);
        let substepper = FieldSubstepper::new(FieldDriverOptions::default(), integrator);

        let y = OdeState {
            pos: [3.808_538_6, 0.0, 0.0],
            mom: [0.0, 10.961_003, 3.196_959],
        };
        let result = substepper.substep(5.0, &y);
        assert!(result.length > 0.0 && result.length <= 5.0);
    }
}
