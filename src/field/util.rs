//! Sagitta (chord-distance) and relative-error helpers for the substepper
//! (§4.2).
//!
//! `original_source/src/celeritas/field/detail/FieldUtils.hh` wasn't among
//! the retrieved sources; `distance_chord` follows the point-to-line
//! distance formula named in `FieldSubstepper.hh`'s docs, and
//! `rel_err_sq` follows spec.md §4.2's `Σᵢ(err_i/max(|y_i|,scale))²`
//! description, normalizing position components by the step length and
//! momentum components by the reference momentum magnitude (a judgment
//! call recorded in `DESIGN.md`).

use super::types::{dot, norm, OdeState};

/// Perpendicular distance from `mid` to the line through `start` and `end`
/// (the sagitta of a curved step relative to its chord).
#[must_use]
pub fn distance_chord(start: [f64; 3], mid: [f64; 3], end: [f64; 3]) -> f64 {
    let chord: [f64; 3] = std::array::from_fn(|i| end[i] - start[i]);
    let chord_len = norm(chord);
    if chord_len < 1e-30 {
        let to_mid: [f64; 3] = std::array::from_fn(|i| mid[i] - start[i]);
        return norm(to_mid);
    }
    let to_mid: [f64; 3] = std::array::from_fn(|i| mid[i] - start[i]);
    let proj = dot(to_mid, chord) / chord_len;
    let closest: [f64; 3] = std::array::from_fn(|i| start[i] + proj / chord_len * chord[i]);
    let perp: [f64; 3] = std::array::from_fn(|i| mid[i] - closest[i]);
    norm(perp)
}

/// Relative truncation-error-squared for a trial step, before division by
/// `epsilon_rel_max^2` (the caller applies that scaling, matching
/// `FieldSubstepper::find_next_chord`/`one_good_step`).
#[must_use]
pub fn rel_err_sq(err: &OdeState, step: f64, mom: [f64; 3]) -> f64 {
    let pos_scale = step.max(1e-30);
    let mom_scale = norm(mom).max(1e-30);
    let mut sum = 0.0;
    for i in 0..3 {
        sum += (err.pos[i] / pos_scale).powi(2);
        sum += (err.mom[i] / mom_scale).powi(2);
    }
    sum
}
