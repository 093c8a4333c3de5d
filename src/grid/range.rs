//! Range and inverse-range calculators, and the range-from-`dE/dx`
//! integrator (§4.1).
//!
//! Grounded on `original_source/src/celeritas/grid/{RangeCalculator,
//! InverseRangeCalculator}.hh` for the two calculators, and on
//! `RangeGridCalculator.cc` for the composite-midpoint integration that
//! builds a range table from a stopping-power (`dE/dx`) table — a
//! supplemented feature not named directly in spec.md §4.1 but required to
//! produce the range tables the calculators consume (see `DESIGN.md`).

use super::uniform::{cubic_hermite, UniformGridRecord, UniformLogGrid};
use super::util::linear_interpolate;
use crate::convert::f64_from_usize;
use crate::error::{Error, Result};

/// Find and interpolate range on a uniform log energy grid.
///
/// Below the minimum tabulated energy the range is scaled as `r =
/// r_min * sqrt(E / E_min)`; above the maximum it clamps to the longest
/// tabulated range.
#[derive(Clone, Debug)]
pub struct RangeCalculator {
    grid: UniformLogGrid,
    values: Vec<f64>,
}

impl RangeCalculator {
    /// Construct from a range table. Range tables are uniform in energy,
    /// with no `1/E` scaling.
    pub fn new(grid: UniformLogGrid, values: Vec<f64>) -> Result<Self> {
        if values.len() != grid.size() {
            return Err(Error::general(format!(
                "range table length {} does not match grid size {}",
                values.len(),
                grid.size()
            )));
        }
        Ok(Self { grid, values })
    }

    /// Calculate the range at energy `e`.
    #[must_use]
    pub fn evaluate(&self, e: f64) -> f64 {
        if e <= self.grid.front() {
            return self.values[0] * (e / self.grid.front()).sqrt();
        }
        if e >= self.grid.back() {
            return self.values[self.values.len() - 1];
        }

        let idx = self.grid.find_bin(e);
        linear_interpolate(
            self.grid.energy(idx),
            self.values[idx],
            self.grid.energy(idx + 1),
            self.values[idx + 1],
            e,
        )
    }
}

/// Calculate the energy that would limit a particle to a particular range:
/// the inverse of [`RangeCalculator`].
///
/// The range table must be monotonically nondecreasing in energy, since
/// range is the integral of the (always positive) inverse stopping power.
/// Below the shortest tabulated range the energy is scaled as `E = E_min *
/// (r / r_min)^2`, the inverse of `RangeCalculator`'s off-the-end scaling.
#[derive(Clone, Debug)]
pub struct InverseRangeCalculator {
    log_energy: UniformLogGrid,
    range: super::nonuniform::NonuniformGrid,
    derivatives: Option<Vec<f64>>,
}

impl InverseRangeCalculator {
    /// Construct from range data matching a uniform log energy grid. The
    /// range values must be monotonically nondecreasing with energy.
    pub fn new(
        grid: UniformLogGrid,
        values: Vec<f64>,
        derivatives: Option<Vec<f64>>,
    ) -> Result<Self> {
        if values.len() != grid.size() {
            return Err(Error::general(format!(
                "range table length {} does not match grid size {}",
                values.len(),
                grid.size()
            )));
        }
        if let Some(d) = &derivatives {
            if d.len() != grid.size() {
                return Err(Error::general(
                    "inverse range derivatives length does not match grid size",
                ));
            }
        }
        let range = super::nonuniform::NonuniformGrid::new(values)?;
        Ok(Self {
            log_energy: grid,
            range,
            derivatives,
        })
    }

    /// Calculate the energy of a particle that has travelled range `r`.
    ///
    /// # Errors
    ///
    /// Returns an error if `r` is negative or exceeds the longest tabulated
    /// range: the step limiter should never let that happen.
    pub fn evaluate(&self, r: f64) -> Result<f64> {
        if r < 0.0 || r > self.range.back() {
            return Err(Error::general(format!(
                "range {r} is out of the tabulated bounds [0, {}]",
                self.range.back()
            )));
        }
        if r < self.range.front() {
            return Ok(self.log_energy.front() * (r / self.range.front()).powi(2));
        }
        if r >= self.range.back() {
            return Ok(self.log_energy.back());
        }

        let idx = self.range.find_bin(r);
        let x0 = self.range.value(idx);
        let x1 = self.range.value(idx + 1);
        let y0 = self.log_energy.energy(idx);
        let y1 = self.log_energy.energy(idx + 1);

        Ok(match &self.derivatives {
            Some(d) => cubic_hermite(x0, y0, d[idx], x1, y1, d[idx + 1], r),
            None => linear_interpolate(x0, y0, x1, y1, r),
        })
    }
}

const INTEGRATION_SUBSTEPS: usize = 100;

/// Build a range table from a stopping-power (`dE/dx`) table by composite
/// midpoint-rule integration, on the same energy grid as `dedx`.
///
/// `R[0] = 2 * E[0] / (dE/dx)[0]`, an approximation of the CSDA range from
/// zero energy assuming `dE/dx` scales as `sqrt(E)` near the origin; each
/// subsequent point integrates `dE / (dE/dx)` over `100` substeps per grid
/// interval.
///
/// # Errors
///
/// Returns an error if any stopping power sampled during integration
/// (including the first tabulated point) is not strictly positive: the
/// stepping-power data must be a genuine energy loss, and a non-positive
/// value — possibly from an unstable spline — would make the integral
/// meaningless.
pub fn range_from_dedx(dedx: &UniformGridRecord) -> Result<Vec<f64>> {
    let grid = dedx.grid();
    let n = grid.size();
    let dedx0 = dedx.values()[0];
    if dedx0 <= 0.0 {
        return Err(Error::general(
            "dE/dx must be positive at the lowest tabulated energy",
        ));
    }

    let mut range = vec![0.0; n];
    let mut cum_range = 2.0 * grid.energy(0) / dedx0;
    range[0] = cum_range;

    let delta = 1.0 / f64_from_usize(INTEGRATION_SUBSTEPS);
    for i in 1..n {
        let energy_lower = grid.energy(i - 1);
        let energy_upper = grid.energy(i);
        let delta_energy = (energy_upper - energy_lower) * delta;
        let mut energy = energy_upper + 0.5 * delta_energy;
        for _ in 0..INTEGRATION_SUBSTEPS {
            energy -= delta_energy;
            let dedx_value = dedx.interpolate(energy);
            if dedx_value <= 0.0 {
                return Err(Error::general(
                    "negative dE/dx encountered while integrating range: the \
                     interpolation method may be unstable",
                ));
            }
            cum_range += delta_energy / dedx_value;
        }
        range[i] = cum_range;
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    // §8 scenario 3: grid E in [10, 1e4], ranges {0.5, 5, 50, 500}.
    #[test]
    fn range_and_inverse_scenario() {
        let grid = UniformLogGrid::new(10.0, 1.0e4, 4).unwrap();
        let values = vec![0.5, 5.0, 50.0, 500.0];
        let range_calc = RangeCalculator::new(grid.clone(), values.clone()).unwrap();
        let inv_calc = InverseRangeCalculator::new(grid, values, None).unwrap();

        assert!((range_calc.evaluate(1.0) - 0.5 * (1.0_f64 / 10.0).sqrt()).abs() < 1e-9);
        assert!((inv_calc.evaluate(0.5).unwrap() - 10.0).abs() < 1e-9);
        assert!((inv_calc.evaluate(500.0).unwrap() - 10000.0).abs() < 1e-6);
    }

    #[test]
    fn range_is_monotone_and_round_trips() {
        let grid = UniformLogGrid::new(10.0, 1.0e4, 4).unwrap();
        let values = vec![0.5, 5.0, 50.0, 500.0];
        let range_calc = RangeCalculator::new(grid.clone(), values.clone()).unwrap();
        let inv_calc = InverseRangeCalculator::new(grid, values, None).unwrap();

        let mut prev = range_calc.evaluate(9.0);
        for e in [20.0, 200.0, 2000.0, 9000.0] {
            let r = range_calc.evaluate(e);
            assert!(r > prev, "range not increasing at E={e}");
            prev = r;

            let back = inv_calc.evaluate(r).unwrap();
            assert!((back - e).abs() / e < 1e-6, "round trip failed at E={e}");
        }
    }

    #[test]
    fn inverse_range_rejects_out_of_bounds() {
        let grid = UniformLogGrid::new(10.0, 1.0e4, 4).unwrap();
        let values = vec![0.5, 5.0, 50.0, 500.0];
        let inv_calc = InverseRangeCalculator::new(grid, values, None).unwrap();
        assert!(inv_calc.evaluate(-1.0).is_err());
        assert!(inv_calc.evaluate(501.0).is_err());
    }

    #[test]
    fn range_from_constant_dedx() {
        let grid = UniformLogGrid::new(1.0, 2.0, 2).unwrap();
        let dedx = UniformGridRecord::new(grid, vec![1.0, 1.0], None, 1).unwrap();
        let range = range_from_dedx(&dedx).unwrap();
        assert!((range[0] - 2.0).abs() < 1e-9);
        assert!((range[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn range_from_dedx_rejects_nonpositive() {
        let grid = UniformLogGrid::new(1.0, 2.0, 2).unwrap();
        let dedx = UniformGridRecord::new(grid, vec![0.0, 1.0], None, 1).unwrap();
        assert!(range_from_dedx(&dedx).is_err());
    }
}
