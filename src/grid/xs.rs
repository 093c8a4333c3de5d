//! Scaled cross-section grid and calculator (§4.1, §3).
//!
//! The data model in spec.md §3 describes this as two uniform-grid
//! records, `lower` and `upper`, glued at a shared breakpoint energy where
//! `upper` values are pre-scaled by `E` (to flatten the `1/E` falloff
//! cross sections typically have at high energy) so that linear
//! interpolation stays accurate across a wide energy range. Grounded
//! directly on `original_source/src/celeritas/grid/{XsGridData,
//! XsCalculator}.hh`: rather than keeping `lower`/`upper` as two
//! independently-sized [`UniformGridRecord`](super::uniform::UniformGridRecord)s
//! (which breaks down when the scaled region is a single point — see
//! `scaled_highest` in the original's test suite), this stores one energy
//! grid, one value array, and a `prime_index` marking the first scaled
//! entry, exactly mirroring the original's representation; `lower()` /
//! `upper()` are exposed as derived views for API parity with the spec's
//! naming.

use super::uniform::{cubic_hermite, UniformLogGrid};
use super::util::linear_interpolate;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A scaled cross-section grid: a uniform-log energy grid, one tabulated
/// value per grid point, a `prime_index` marking the first index whose
/// stored value is pre-scaled by its energy, and optional second
/// derivatives for cubic-spline interpolation (mutually exclusive with
/// scaling, matching the original's `prime_index == no_scaling()`
/// assertion when derivatives are present).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScaledXsGrid {
    grid: UniformLogGrid,
    values: Vec<f64>,
    prime_index: usize,
    derivatives: Option<Vec<f64>>,
}

impl ScaledXsGrid {
    /// No entries are scaled.
    #[must_use]
    pub fn no_scaling(grid: UniformLogGrid, values: Vec<f64>) -> Result<Self> {
        Self::new(grid, values, usize::MAX, None)
    }

    /// Construct, scaling entries at or after `prime_index` by their
    /// energy. Pass `usize::MAX` for `prime_index` to disable scaling
    /// entirely.
    pub fn new(
        grid: UniformLogGrid,
        values: Vec<f64>,
        prime_index: usize,
        derivatives: Option<Vec<f64>>,
    ) -> Result<Self> {
        if values.len() != grid.size() {
            return Err(Error::general(format!(
                "xs grid values length {} does not match grid size {}",
                values.len(),
                grid.size()
            )));
        }
        if let Some(d) = &derivatives {
            if d.len() != grid.size() {
                return Err(Error::general(
                    "xs grid derivatives length does not match grid size",
                ));
            }
            if prime_index < values.len() {
                return Err(Error::general(
                    "spline xs grids may not also use 1/E scaling",
                ));
            }
        }
        Ok(Self {
            grid,
            values,
            prime_index,
            derivatives,
        })
    }

    /// The raw stored value at `index` (scaled if `index >= prime_index`).
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    fn extrapolated(&self, index: usize, query_energy: f64) -> f64 {
        let mut result = self.values[index];
        if index >= self.prime_index {
            result /= query_energy;
        }
        result
    }

    /// The unscaled cross section at grid index `index` (i.e. what
    /// `evaluate(energy(index))` would return).
    #[must_use]
    pub fn index_value(&self, index: usize) -> f64 {
        self.extrapolated(index, self.grid.energy(index))
    }

    /// Evaluate the cross section at `e`.
    #[must_use]
    pub fn evaluate(&self, e: f64) -> f64 {
        if e <= self.grid.front() {
            return self.extrapolated(0, e);
        }
        let n = self.grid.size();
        if e >= self.grid.back() {
            return self.extrapolated(n - 1, e);
        }

        let lower_idx = self.grid.find_bin(e);
        let lower_energy = self.grid.energy(lower_idx);
        let upper_energy = self.grid.energy(lower_idx + 1);

        if let Some(deriv) = &self.derivatives {
            return cubic_hermite(
                lower_energy,
                self.values[lower_idx],
                deriv[lower_idx],
                upper_energy,
                self.values[lower_idx + 1],
                deriv[lower_idx + 1],
                e,
            );
        }

        let mut upper_xs = self.values[lower_idx + 1];
        if lower_idx + 1 == self.prime_index {
            // this point is the first scaled entry; unscale it so the bin
            // interpolates consistently in unscaled space
            upper_xs /= upper_energy;
        }

        let mut result = linear_interpolate(
            lower_energy,
            self.values[lower_idx],
            upper_energy,
            upper_xs,
            e,
        );
        if lower_idx >= self.prime_index {
            result /= e;
        }
        result
    }
}
