//! Tabulated-grid interpolators (§4.1): uniform and log-uniform energy
//! grids, cubic-spline and piecewise-Lagrange interpolation, the scaled
//! cross-section representation, and range / inverse-range calculators.

pub mod nonuniform;
pub mod range;
pub mod spline;
pub mod uniform;
pub mod util;
pub mod xs;

pub use nonuniform::NonuniformGrid;
pub use range::{range_from_dedx, InverseRangeCalculator, RangeCalculator};
pub use spline::{solve_second_derivatives, BoundaryCondition};
pub use uniform::{UniformGrid, UniformGridRecord, UniformLogGrid};
pub use xs::ScaledXsGrid;
