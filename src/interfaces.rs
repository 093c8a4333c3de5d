//! External collaborator interfaces (§6): geometry, particle, and material
//! views, the RNG engine, and the action dispatcher. The core is generic
//! over these traits; it never owns a concrete geometry or particle
//! stack.
//!
//! Grounded on spec.md §6's interface list and on the trait-based
//! `enum_dispatch`/collaborator pattern the teacher uses for its
//! `Subgrid`/dynamic-dispatch seams (`pineappl/src/subgrid.rs`).

use crate::ids::{ElementComponentId, ElementId, ParticleId};

/// The outcome of asking the geometry how far the track can move before
/// crossing a boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NextStep {
    /// Straight-line distance to the next boundary along the current
    /// direction.
    pub distance: f64,
    /// Whether a boundary lies within the queried distance.
    pub boundary: bool,
}

/// Geometry navigation, consumed by the field propagator and the along-step
/// actions (§6.1).
pub trait GeometryView {
    /// Current position.
    fn pos(&self) -> [f64; 3];
    /// Current direction (unit vector).
    fn dir(&self) -> [f64; 3];
    /// Overwrite the direction (e.g. after a curved-step rotation).
    fn set_dir(&mut self, d: [f64; 3]);
    /// Distance and presence of the next boundary along `dir()`.
    fn find_next_step(&self) -> NextStep;
    /// Move without crossing a boundary, to the given position.
    fn move_internal(&mut self, pos: [f64; 3]);
    /// Move exactly to the boundary found by `find_next_step`.
    fn move_to_boundary(&mut self);
    /// Whether the track currently sits on a boundary.
    fn is_on_boundary(&self) -> bool;
    /// Cross into the next logical volume after reaching a boundary.
    fn cross_boundary(&mut self);
    /// Surface normal at the current position, if on a boundary.
    fn normal(&self) -> Option<[f64; 3]> {
        None
    }
}

/// Particle species and kinematic state (§6.2).
pub trait ParticleView {
    /// The particle's species id.
    fn particle_id(&self) -> ParticleId;
    /// Kinetic energy (MeV).
    fn energy(&self) -> f64;
    /// Overwrite the kinetic energy.
    fn set_energy(&mut self, e: f64);
    /// Rest mass (MeV/c²).
    fn mass(&self) -> f64;
    /// Charge, in elementary-charge units.
    fn charge(&self) -> f64;
    /// Whether the kinetic energy has reached zero.
    fn is_stopped(&self) -> bool {
        self.energy() <= 0.0
    }
    /// Whether this is an antiparticle (used for annihilation deposition).
    fn is_antiparticle(&self) -> bool;
    /// Whether this species is "heavy" (muon and above) for the purposes
    /// of the scaled step limiter (§4.3).
    fn is_heavy(&self) -> bool;
    /// Total energy (kinetic plus rest mass).
    fn total_energy(&self) -> f64 {
        self.energy() + self.mass()
    }
}

/// Material composition queries (§6.3).
pub trait MaterialView {
    /// Number of element components in this material.
    fn num_elements(&self) -> usize;
    /// The element id backing a given component slot.
    fn element_id(&self, component: ElementComponentId) -> ElementId;
    /// Number density of the given component (atoms / volume, native
    /// units).
    fn element_record(&self, component: ElementComponentId) -> f64;
    /// Electron number density (native units).
    fn electron_density(&self) -> f64;
    /// Radiation length (native length units).
    fn radiation_length(&self) -> f64;
    /// Per-component number fractions, summing to 1.
    fn element_fractions(&self) -> Vec<f64>;
}

/// A source of uniformly distributed 32-bit integers; all higher-level
/// sampling (`U(0,1)`, normal, exponential, rejection) is built on top in
/// [`crate::rng`] (§6.4).
pub trait RngEngine {
    /// Draw the next raw 32-bit word.
    fn next_u32(&mut self) -> u32;
}

/// Schedules and invokes actions by id (§6.5). The core only produces
/// [`crate::ids::ActionId`] values; it never owns the dispatch table.
pub trait ActionDispatcher {
    /// Invoke the action with the given id for the current (params, state)
    /// pair implied by the dispatcher's own context.
    fn dispatch(&mut self, action: crate::ids::ActionId);
}
