//! The field propagator: drives a [`FieldSubstepper`] across a geometry,
//! stopping early at volume boundaries (§4.2).
//!
//! `original_source/src/celeritas/field/FieldPropagator.hh` wasn't among
//! the retrieved sources (only its test suite was); the control flow below
//! implements spec.md §4.2's "Propagator" bullets directly against the
//! [`GeometryView`] interface, using `MakeMagFieldPropagator.hh`'s
//! composition of substepper + particle + geometry as the grounding for
//! how the pieces fit together.

use crate::interfaces::GeometryView;

use super::integrators::Integrator;
use super::substepper::FieldSubstepper;
use super::types::{norm, OdeState};

/// Outcome of a single `propagate` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropagationResult {
    /// Curved-path distance actually travelled, in `(0, requested]`.
    pub distance: f64,
    /// Whether the track stopped at a geometry boundary.
    pub boundary: bool,
    /// Whether the substep budget was exhausted without reaching either
    /// the requested distance or a boundary.
    pub looping: bool,
}

/// Propagates a charged particle through a magnetic field, stopping at
/// geometry boundaries.
pub struct FieldPropagator<'g, I, G> {
    substepper: FieldSubstepper<I>,
    geometry: &'g mut G,
}

impl<'g, I: Integrator, G: GeometryView> FieldPropagator<'g, I, G> {
    /// Construct from a substepper and a mutable geometry view.
    pub fn new(substepper: FieldSubstepper<I>, geometry: &'g mut G) -> Self {
        Self {
            substepper,
            geometry,
        }
    }

    /// Advance the track by up to `s`, moving the geometry view and
    /// reporting how far it actually got.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `s` is not positive or `momentum` is not
    /// positive.
    pub fn propagate(&mut self, s: f64, momentum: f64) -> PropagationResult {
        debug_assert!(s > 0.0);
        debug_assert!(momentum > 0.0);

        let options = self.substepper.options();
        let mut state = OdeState {
            pos: self.geometry.pos(),
            mom: std::array::from_fn(|i| self.geometry.dir()[i] * momentum),
        };

        let mut remaining = s;
        let mut travelled = 0.0;
        let mut boundary = false;
        let mut looping = true;

        for _ in 0..options.max_substeps {
            if remaining <= 0.0 {
                looping = false;
                break;
            }

            let trial = self.substepper.substep(remaining, &state);
            let chord: [f64; 3] = std::array::from_fn(|i| trial.state.pos[i] - state.pos[i]);
            let chord_len = norm(chord);
            let next = self.geometry.find_next_step();

            if next.boundary && chord_len > next.distance + options.delta_intersection {
                // The trial overshoots the boundary: shrink proportionally
                // along the (locally straight) chord to intersect it.
                let scale = (next.distance / chord_len).clamp(0.0, 1.0);
                state = interpolate(&state, &trial.state, scale);
                travelled += trial.length * scale;
                boundary = true;
                looping = false;
                sync_geometry(self.geometry, &state);
                break;
            }

            if next.boundary && (chord_len - next.distance).abs() <= options.delta_intersection {
                // Within tolerance of the boundary: treat the full trial as
                // a hit rather than deferring to the next substep.
                state = trial.state;
                travelled += trial.length;
                boundary = true;
                looping = false;
                sync_geometry(self.geometry, &state);
                break;
            }

            state = trial.state;
            travelled += trial.length;
            remaining -= trial.length;
            // Keep the geometry current so the next iteration's
            // `find_next_step()` queries from where the track actually is.
            sync_geometry(self.geometry, &state);
            if remaining <= options.delta_intersection {
                looping = false;
                break;
            }
        }

        if boundary {
            self.geometry.move_to_boundary();
        }

        debug_assert!(travelled > 0.0 && travelled <= s + options.delta_intersection);
        PropagationResult {
            distance: travelled,
            boundary,
            looping,
        }
    }
}

/// Push `state`'s position and direction into the geometry so that the
/// next `find_next_step()` query sees the track's true current location.
fn sync_geometry<G: GeometryView>(geometry: &mut G, state: &OdeState) {
    let mom_norm = norm(state.mom);
    geometry.set_dir(std::array::from_fn(|i| state.mom[i] / mom_norm));
    geometry.move_internal(state.pos);
}

fn interpolate(a: &OdeState, b: &OdeState, t: f64) -> OdeState {
    OdeState {
        pos: std::array::from_fn(|i| a.pos[i] + t * (b.pos[i] - a.pos[i])),
        mom: std::array::from_fn(|i| a.mom[i] + t * (b.mom[i] - a.mom[i])),
    }
}
