//! The Lorentz equation of motion and concrete field maps (§4.2).
//!
//! Grounded on `original_source/src/celeritas/field/{MagFieldEquation,
//! UniformZField}.hh`. The Lorentz coefficient is pinned by
//! `original_source/test/celeritas/field/Integrators.test.cc`'s helix
//! fixture: `coeff = |p| / (radius * B) = 2.99792458`, the numeric value of
//! `c_light` in units of `1e8 m/s` — i.e. `MeV/(c*tesla*cm)` per unit
//! elementary charge.

use super::types::{cross, dot, OdeState};

/// `c_light` expressed in `MeV / (c * tesla * cm)` per elementary charge:
/// the Lorentz-force coefficient linking field (tesla), momentum (MeV/c),
/// and curvature (1/cm).
pub const LORENTZ_COEFF: f64 = 2.997_924_58;

/// A magnetic field sampled at a position, in tesla.
pub trait MagneticField {
    /// Field vector at `pos`.
    fn at(&self, pos: [f64; 3]) -> [f64; 3];
}

/// A uniform field in an arbitrary direction.
#[derive(Clone, Copy, Debug)]
pub struct UniformField {
    value: [f64; 3],
}

impl UniformField {
    /// Construct from a constant field vector (tesla).
    #[must_use]
    pub const fn new(value: [f64; 3]) -> Self {
        Self { value }
    }
}

impl MagneticField for UniformField {
    fn at(&self, _pos: [f64; 3]) -> [f64; 3] {
        self.value
    }
}

/// A uniform field along the z axis; the only field the analytic
/// [`super::integrators::ZHelixIntegrator`](super::integrators::ZHelixIntegrator)
/// supports.
#[derive(Clone, Copy, Debug)]
pub struct UniformZField {
    value: f64,
}

impl UniformZField {
    /// Construct with the field strength along z (tesla).
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self { value }
    }

    /// The field strength along z (tesla).
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

impl MagneticField for UniformZField {
    fn at(&self, _pos: [f64; 3]) -> [f64; 3] {
        [0.0, 0.0, self.value]
    }
}

/// Evaluate the right-hand side of the Lorentz equation, `dr/ds = p/|p|`,
/// `dp/ds = (q/|p|) * (p x B(r))`.
#[derive(Clone, Copy, Debug)]
pub struct MagFieldEquation<F> {
    field: F,
    coeff: f64,
}

impl<F: MagneticField> MagFieldEquation<F> {
    /// Construct from a field map and a charge in elementary-charge units.
    ///
    /// # Panics
    ///
    /// Panics if `charge == 0`: neutral particles don't bend in a field and
    /// must take the straight-line along-step action instead.
    #[must_use]
    pub fn new(field: F, charge: f64) -> Self {
        assert!(charge != 0.0, "MagFieldEquation requires nonzero charge");
        Self {
            field,
            coeff: charge * LORENTZ_COEFF,
        }
    }

    /// Evaluate `dy/ds` at state `y`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `y.mom` is the zero vector.
    #[must_use]
    pub fn evaluate(&self, y: &OdeState) -> OdeState {
        let field = self.field.at(y.pos);
        let mom2 = dot(y.mom, y.mom);
        debug_assert!(mom2 > 0.0);
        let mom_inv = 1.0 / mom2.sqrt();

        let mut result = OdeState::zero();
        for i in 0..3 {
            result.pos[i] = mom_inv * y.mom[i];
        }
        let force = cross(y.mom, field);
        for i in 0..3 {
            result.mom[i] = self.coeff * mom_inv * force[i];
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_with_no_perpendicular_field() {
        let eq = MagFieldEquation::new(UniformZField::new(0.0), -1.0);
        let y = OdeState {
            pos: [0.0, 0.0, 0.0],
            mom: [0.0, 0.0, 5.0],
        };
        let rhs = eq.evaluate(&y);
        assert!((rhs.pos[2] - 1.0).abs() < 1e-12);
        assert!(rhs.mom.iter().all(|&m| m.abs() < 1e-12));
    }
}
