//! Nonuniform grids: a sorted, monotonically nondecreasing sequence of
//! grid points (§3, §4.1). Grounded on
//! `original_source/src/corecel/grid/NonuniformGrid.hh`.

use super::util::locate_bin;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A sorted, monotonically nondecreasing sequence of grid points.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NonuniformGrid {
    points: Vec<f64>,
}

impl NonuniformGrid {
    /// Construct from points, validating they are sorted and number at
    /// least two.
    pub fn new(points: Vec<f64>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::general("nonuniform grid needs at least 2 points"));
        }
        if !points.windows(2).all(|w| w[0] <= w[1]) {
            return Err(Error::general(
                "nonuniform grid points must be monotonically nondecreasing",
            ));
        }
        Ok(Self { points })
    }

    /// Number of grid points.
    #[must_use]
    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// The value at `index`.
    #[must_use]
    pub fn value(&self, index: usize) -> f64 {
        self.points[index]
    }

    /// The first point.
    #[must_use]
    pub fn front(&self) -> f64 {
        self.points[0]
    }

    /// The last point.
    #[must_use]
    pub fn back(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Locate the bin `i` such that `value(i) <= x < value(i + 1)`, clamped
    /// to the grid range.
    #[must_use]
    pub fn find_bin(&self, x: f64) -> usize {
        locate_bin(&self.points, x)
    }
}
