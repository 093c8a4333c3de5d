//! A per-step Monte Carlo particle-transport core: tabulated grid
//! interpolators, a physics registry for discrete-interaction selection,
//! and a magnetic-field propagator, generic over externally owned
//! geometry/particle/material state and RNG streams.

pub mod error;
pub mod convert;
pub mod units;
pub mod ids;
pub mod grid;
pub mod field;
pub mod interfaces;
pub mod options;
pub mod phys;
pub mod rng;
pub mod track;
