//! Interaction applier (§4.6): apply a model-produced [`Interaction`] to a
//! track, folding sub-cutoff secondaries into local deposition.
//!
//! Grounded on
//! `original_source/src/celeritas/phys/InteractionApplier.hh`/`Interaction.hh`.

use crate::ids::ParticleId;
use crate::interfaces::{GeometryView, ParticleView};

use super::cutoff::CutoffView;

/// What a model's interaction did to the primary track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionKind {
    /// Direction (and possibly energy) changed; the track survives.
    Scattered,
    /// The track deposited all its energy and is killed.
    Absorbed,
    /// The model could not produce a valid interaction (e.g. the
    /// secondary stack was exhausted); the track retries at its current
    /// position on the next cycle.
    Failed,
    /// No state change.
    Unchanged,
}

/// A secondary particle produced by the interaction, before cutoff
/// folding.
#[derive(Clone, Copy, Debug)]
pub struct Secondary {
    /// Species of the secondary.
    pub particle: ParticleId,
    /// Kinetic energy (MeV).
    pub energy: f64,
    /// Direction (unit vector).
    pub direction: [f64; 3],
    /// Rest mass (MeV/c²), needed for the antiparticle annihilation term.
    pub mass: f64,
    /// Whether this secondary is an antiparticle.
    pub is_antiparticle: bool,
    /// Statistical weight; always overwritten with the parent's weight by
    /// [`apply_interaction`].
    pub weight: f64,
}

/// The interaction record a model produces for the primary track (§4.6).
#[derive(Clone, Debug)]
pub struct Interaction {
    /// What happened to the primary.
    pub kind: InteractionKind,
    /// Post-interaction kinetic energy (meaningful for `Scattered` and
    /// `Absorbed`).
    pub energy: f64,
    /// Post-interaction direction (meaningful for `Scattered`).
    pub direction: [f64; 3],
    /// Energy deposited locally by the interaction itself (before cutoff
    /// folding).
    pub energy_deposition: f64,
    /// Secondaries produced, before cutoff folding.
    pub secondaries: Vec<Secondary>,
}

/// What the caller must do after applying the interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyResult {
    /// The track's step limit should become `(0, failure_action)`; it
    /// reattempts at its current position next cycle.
    Failed,
    /// No state changed.
    Unchanged,
    /// The interaction was applied; `killed` says whether the track
    /// should be marked dead.
    Applied {
        /// Whether the primary track was killed (absorbed).
        killed: bool,
    },
}

/// The outcome of applying an interaction: what happened to the primary,
/// the total energy to deposit locally (`D`, including cutoff-folded
/// secondaries), and the secondaries that survived cutoff folding.
#[derive(Clone, Debug)]
pub struct ApplyOutcome {
    /// What the caller must do with the primary track.
    pub result: ApplyResult,
    /// Total local energy deposition, `D`.
    pub deposited_energy: f64,
    /// Surviving secondaries, with weight copied from the parent.
    pub secondaries: Vec<Secondary>,
}

/// Apply `interaction` to the primary track, folding any secondary whose
/// kinetic energy is below `cutoff`'s threshold for its species into local
/// deposition rather than spawning it.
///
/// # Panics
///
/// Panics (debug) if a surviving interaction leaves a non-unit direction.
pub fn apply_interaction(
    interaction: Interaction,
    parent_weight: f64,
    particle: &mut impl ParticleView,
    geometry: &mut impl GeometryView,
    cutoff: &CutoffView,
) -> ApplyOutcome {
    match interaction.kind {
        InteractionKind::Failed => {
            return ApplyOutcome {
                result: ApplyResult::Failed,
                deposited_energy: 0.0,
                secondaries: Vec::new(),
            };
        }
        InteractionKind::Unchanged => {
            return ApplyOutcome {
                result: ApplyResult::Unchanged,
                deposited_energy: 0.0,
                secondaries: Vec::new(),
            };
        }
        InteractionKind::Scattered => {
            particle.set_energy(interaction.energy);
            geometry.set_dir(interaction.direction);
        }
        InteractionKind::Absorbed => {
            particle.set_energy(interaction.energy);
        }
    }

    let mut deposited = interaction.energy_deposition;
    let mut survivors = Vec::with_capacity(interaction.secondaries.len());
    for mut secondary in interaction.secondaries {
        secondary.weight = parent_weight;
        let below_cutoff = secondary.energy < cutoff.energy(secondary.particle);
        if below_cutoff {
            deposited += secondary.energy * secondary.weight;
            if secondary.is_antiparticle {
                deposited += 2.0 * secondary.mass * secondary.weight;
            }
        } else {
            survivors.push(secondary);
        }
    }

    if matches!(interaction.kind, InteractionKind::Scattered) {
        let dir = geometry.dir();
        let norm_sq: f64 = dir.iter().map(|d| d * d).sum();
        debug_assert!((norm_sq - 1.0).abs() < 1e-6, "direction must stay unit-length");
    }
    debug_assert!(survivors.iter().all(|s| (s.weight - parent_weight).abs() < 1e-12));

    ApplyOutcome {
        result: ApplyResult::Applied {
            killed: matches!(interaction.kind, InteractionKind::Absorbed),
        },
        deposited_energy: deposited,
        secondaries: survivors,
    }
}
