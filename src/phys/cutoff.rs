//! Per-material, per-particle production cutoff energies (§4.6).
//!
//! Supplemented from `original_source/src/celeritas/phys/PhysicsTrackView.hh`'s
//! `CutoffView`: §4.6 references a "material/particle cutoff" when folding
//! sub-threshold secondaries into deposition without specifying its
//! storage, so this mirrors the original's flat per-(material, particle)
//! energy table.

use crate::error::{Error, Result};
use crate::ids::{MaterialId, ParticleId};
use serde::{Deserialize, Serialize};

/// Production cutoff energies, one per `(material, particle)` pair.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CutoffParams {
    num_particles: usize,
    energies: Vec<f64>,
}

impl CutoffParams {
    /// Construct from a dense `[material][particle]` table of cutoff
    /// energies (MeV); every row must have the same length.
    pub fn new(energies_by_material: Vec<Vec<f64>>) -> Result<Self> {
        let num_particles = energies_by_material.first().map_or(0, Vec::len);
        if energies_by_material
            .iter()
            .any(|row| row.len() != num_particles)
        {
            return Err(Error::general(
                "cutoff table rows must all have the same number of particles",
            ));
        }
        let energies = energies_by_material.into_iter().flatten().collect();
        Ok(Self {
            num_particles,
            energies,
        })
    }

    /// The cutoff energy for `particle` in `material`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if either id is out of range for this table.
    #[must_use]
    pub fn energy(&self, material: MaterialId, particle: ParticleId) -> f64 {
        let row = material.unchecked_get();
        let col = particle.unchecked_get();
        debug_assert!(col < self.num_particles);
        self.energies[row * self.num_particles + col]
    }

    /// A view scoped to one material.
    #[must_use]
    pub const fn view(&self, material: MaterialId) -> CutoffView<'_> {
        CutoffView {
            params: self,
            material,
        }
    }
}

/// A [`CutoffParams`] table scoped to the current track's material, as
/// consumed by the interaction applier (§4.6).
#[derive(Clone, Copy, Debug)]
pub struct CutoffView<'a> {
    params: &'a CutoffParams,
    material: MaterialId,
}

impl CutoffView<'_> {
    /// The cutoff energy for `particle` in this view's material.
    #[must_use]
    pub fn energy(&self, particle: ParticleId) -> f64 {
        self.params.energy(self.material, particle)
    }
}
