//! Uniform grids, uniform-log (energy) grids, and the grid record that
//! bundles a grid with tabulated values, optional spline second
//! derivatives, and a spline order (§4.1).
//!
//! Grounded on `original_source/src/corecel/grid/UniformGridData.hh` and
//! `original_source/src/celeritas/grid/UniformLogGridCalculator.hh`.

use super::spline::lagrange_evaluate;
use super::util::{clamp, linear_interpolate, locate_bin};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A grid of `size` points evenly spaced between `front` and `back`.
///
/// Invariants: `size >= 2`, `front < back`, `delta = (back - front) / (size
/// - 1) > 0`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UniformGrid {
    size: usize,
    front: f64,
    back: f64,
}

impl UniformGrid {
    /// Construct a uniform grid, validating the invariants above.
    pub fn new(front: f64, back: f64, size: usize) -> Result<Self> {
        if size < 2 {
            return Err(Error::general(format!(
                "uniform grid needs at least 2 points, got {size}"
            )));
        }
        if !(front < back) {
            return Err(Error::general(format!(
                "uniform grid front ({front}) must be less than back ({back})"
            )));
        }
        Ok(Self { size, front, back })
    }

    /// Number of grid points.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The first grid value.
    #[must_use]
    pub const fn front(&self) -> f64 {
        self.front
    }

    /// The last grid value.
    #[must_use]
    pub const fn back(&self) -> f64 {
        self.back
    }

    /// Spacing between consecutive grid points.
    #[must_use]
    pub fn delta(&self) -> f64 {
        (self.back - self.front) / crate::convert::f64_from_usize(self.size - 1)
    }

    /// The value at `index`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `index >= size()`.
    #[must_use]
    pub fn value(&self, index: usize) -> f64 {
        debug_assert!(index < self.size);
        if index == self.size - 1 {
            // avoid accumulating rounding error at the last point
            self.back
        } else {
            crate::convert::f64_from_usize(index).mul_add(self.delta(), self.front)
        }
    }

    /// All grid point values.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        (0..self.size).map(|i| self.value(i)).collect()
    }

    /// Locate the bin `i` such that `value(i) <= x < value(i + 1)`, clamped
    /// to the grid's range.
    #[must_use]
    pub fn find_bin(&self, x: f64) -> usize {
        let values = self.values();
        locate_bin(&values, x)
    }
}

/// A uniform grid over `ln(E)` used for tabulated energy-dependent
/// quantities. Queries are made in `E`-space; interpolation is linear *on
/// energy*, not on `ln(E)` (§4.1).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UniformLogGrid {
    log_grid: UniformGrid,
}

impl UniformLogGrid {
    /// Construct from energy bounds `[front, back]`, both in MeV and > 0.
    pub fn new(front: f64, back: f64, size: usize) -> Result<Self> {
        if front <= 0.0 {
            return Err(Error::general(format!(
                "log grid front energy must be positive, got {front}"
            )));
        }
        let log_grid = UniformGrid::new(front.ln(), back.ln(), size)?;
        Ok(Self { log_grid })
    }

    /// Number of grid points.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.log_grid.size()
    }

    /// The lowest tabulated energy.
    #[must_use]
    pub fn front(&self) -> f64 {
        self.log_grid.front().exp()
    }

    /// The highest tabulated energy.
    #[must_use]
    pub fn back(&self) -> f64 {
        self.log_grid.back().exp()
    }

    /// Energy at grid point `index`.
    #[must_use]
    pub fn energy(&self, index: usize) -> f64 {
        self.log_grid.value(index).exp()
    }

    /// All grid-point energies.
    #[must_use]
    pub fn energies(&self) -> Vec<f64> {
        (0..self.size()).map(|i| self.energy(i)).collect()
    }

    /// Locate the bin `i` such that `energy(i) <= e < energy(i + 1)`; the
    /// search itself happens in log space but the bounds returned index
    /// into the energy grid.
    #[must_use]
    pub fn find_bin(&self, e: f64) -> usize {
        self.log_grid.find_bin(e.ln())
    }
}

/// A uniform grid record: a uniform-log energy grid, a tabulated value at
/// each grid point, an optional second-derivative table (empty ⇒ linear
/// interpolation), and a spline order (`order > 1` ⇒ piecewise-Lagrange
/// interpolation with no continuous derivative).
///
/// See `DESIGN.md` "(a)" for how these two knobs — `spline_order` and the
/// presence of `derivatives` — are resolved when both could apply:
/// derivatives, if present, always win.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UniformGridRecord {
    grid: UniformLogGrid,
    values: Vec<f64>,
    derivatives: Option<Vec<f64>>,
    spline_order: usize,
}

impl UniformGridRecord {
    /// Construct a record, validating that `values` (and `derivatives`, if
    /// given) match the grid size and that `spline_order >= 1`.
    pub fn new(
        grid: UniformLogGrid,
        values: Vec<f64>,
        derivatives: Option<Vec<f64>>,
        spline_order: usize,
    ) -> Result<Self> {
        if values.len() != grid.size() {
            return Err(Error::general(format!(
                "grid record values length {} does not match grid size {}",
                values.len(),
                grid.size()
            )));
        }
        if let Some(d) = &derivatives {
            if d.len() != grid.size() {
                return Err(Error::general(format!(
                    "grid record derivatives length {} does not match grid size {}",
                    d.len(),
                    grid.size()
                )));
            }
        }
        if spline_order < 1 {
            return Err(Error::general("spline order must be at least 1"));
        }
        Ok(Self {
            grid,
            values,
            derivatives,
            spline_order,
        })
    }

    /// The underlying energy grid.
    #[must_use]
    pub const fn grid(&self) -> &UniformLogGrid {
        &self.grid
    }

    /// The tabulated values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Whether this record carries second derivatives (cubic-spline mode).
    #[must_use]
    pub const fn has_derivatives(&self) -> bool {
        self.derivatives.is_some()
    }

    /// The configured spline order.
    #[must_use]
    pub const fn spline_order(&self) -> usize {
        self.spline_order
    }

    /// Interpolate the tabulated value at energy `e`, snapping
    /// out-of-range queries to the nearest endpoint value (§4.1).
    #[must_use]
    pub fn interpolate(&self, e: f64) -> f64 {
        let e = clamp(e, self.grid.front(), self.grid.back());
        if e <= self.grid.front() {
            return self.values[0];
        }
        if e >= self.grid.back() {
            return self.values[self.values.len() - 1];
        }

        let i = self.grid.find_bin(e);

        if let Some(deriv) = &self.derivatives {
            return cubic_hermite(
                self.grid.energy(i),
                self.values[i],
                deriv[i],
                self.grid.energy(i + 1),
                self.values[i + 1],
                deriv[i + 1],
                e,
            );
        }

        if self.spline_order > 1 {
            return lagrange_evaluate(&self.grid.energies(), &self.values, self.spline_order, e);
        }

        linear_interpolate(
            self.grid.energy(i),
            self.values[i],
            self.grid.energy(i + 1),
            self.values[i + 1],
            e,
        )
    }
}

/// Cubic-spline Hermite interpolation on `[x0, x1]`, given values and
/// second derivatives at the endpoints. Standard natural-cubic-spline
/// evaluation formula.
pub(super) fn cubic_hermite(
    x0: f64,
    y0: f64,
    y2_0: f64,
    x1: f64,
    y1: f64,
    y2_1: f64,
    x: f64,
) -> f64 {
    let h = x1 - x0;
    let a = (x1 - x) / h;
    let b = (x - x0) / h;
    a * y0 + b * y1 + ((a.powi(3) - a) * y2_0 + (b.powi(3) - b) * y2_1) * h * h / 6.0
}
