//! Discrete interaction selector (§4.5): sample a process, recheck
//! integral-XS acceptance, find its model, and sample an element.
//!
//! Grounded on `original_source/src/celeritas/phys/PhysicsStepUtils.hh`'s
//! `find_ppid` (the integral-rejection recheck uses
//! `generate_canonical(rng) * sigma_max > sigma(E1)` to reject, i.e. accepts
//! with probability `sigma(E1)/sigma_max`).

use crate::ids::{ElementComponentId, MaterialId, ParticleModelId, ParticleProcessId};
use crate::interfaces::RngEngine;
use crate::rng::generate_canonical;

use super::registry::ProcessGroup;

/// The result of a discrete-selection attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// An integral-method process was sampled but rejected at the
    /// post-step energy; the caller leaves the track unchanged.
    Rejection,
    /// A process, model, and (if applicable) element were selected.
    Selected {
        /// The selected process.
        process: ParticleProcessId,
        /// The model whose energy window covers the post-step energy.
        model: ParticleModelId,
        /// The sampled element component, if the material has more than
        /// one and the model varies by element.
        element: Option<ElementComponentId>,
    },
}

/// Sample a discrete interaction (§4.5). `process_xs` are the per-process
/// macroscopic cross sections computed at pre-step energy by
/// [`super::step_limit::calculate_step_limit`]; `post_step_energy` is the
/// energy after any continuous loss/propagation over the step.
///
/// Caller contract: on entry the step-limit action is `discrete` and
/// `mfp <= 0`; the caller resets the track's MFP so it is resampled on the
/// next pre-step (§4.7) regardless of this function's outcome.
///
/// # Panics
///
/// Panics (debug) if `process_xs` is empty, or if an at-rest-stopped track
/// has no registered at-rest process.
pub fn select_discrete_interaction(
    process_group: &ProcessGroup,
    material: MaterialId,
    post_step_energy: f64,
    is_stopped: bool,
    process_xs: &[f64],
    rng: &mut impl RngEngine,
) -> SelectionOutcome {
    debug_assert!(!process_xs.is_empty());

    if is_stopped {
        if let Some(at_rest) = process_group.at_rest_process() {
            let ppid = process_group
                .find(at_rest.process)
                .expect("at-rest process must be registered in its own group");
            let model = at_rest.models.find_model(0.0);
            return SelectionOutcome::Selected {
                process: ppid,
                model,
                element: None,
            };
        }
        unreachable!("stopped particle without an at-rest process must not reach selection");
    }

    let total: f64 = process_xs.iter().sum();
    let u = generate_canonical(rng) * total;
    let mut cumulative = 0.0;
    let mut chosen = process_xs.len() - 1;
    for (i, &xs) in process_xs.iter().enumerate() {
        cumulative += xs;
        if cumulative > u {
            chosen = i;
            break;
        }
    }
    let ppid = ParticleProcessId::new(chosen);
    let entry = &process_group.entries()[chosen];

    if entry.integral_xs.is_some() {
        let recomputed = entry
            .macro_xs
            .get(material)
            .map_or(0.0, |grid| grid.evaluate(post_step_energy));
        if generate_canonical(rng) * process_xs[chosen] > recomputed {
            return SelectionOutcome::Rejection;
        }
    }

    let model = entry.models.find_model(post_step_energy);

    let element = entry.element_cdf.get(material).map(|cdf| {
        let u = generate_canonical(rng);
        cdf.sample(post_step_energy, u)
    });

    SelectionOutcome::Selected {
        process: ppid,
        model,
        element,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::uniform::UniformLogGrid;
    use crate::grid::xs::ScaledXsGrid;
    use crate::ids::ProcessId;
    use crate::phys::registry::{IntegralXsProcess, ModelGroup, ProcessEntry, ValueTable};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct PcgEngine(Pcg32);
    impl RngEngine for PcgEngine {
        fn next_u32(&mut self) -> u32 {
            use rand::RngCore;
            self.0.next_u32()
        }
    }

    fn group_with_integral_xs() -> ProcessGroup {
        // §8 scenario 5: sigma drops linearly from 1.2 at E=0.1 to 0.6 at E=10.
        let grid = UniformLogGrid::new(0.1, 10.0, 2).unwrap();
        let xs = ScaledXsGrid::no_scaling(grid, vec![1.2, 0.6]).unwrap();
        let entry = ProcessEntry {
            process: ProcessId::new(0),
            models: ModelGroup::new(vec![(0.0, f64::INFINITY, crate::ids::ParticleModelId::new(0))])
                .unwrap(),
            macro_xs: ValueTable::new(vec![Some(xs)]),
            integral_xs: Some(IntegralXsProcess::new(vec![Some(0.1)])),
            element_cdf: ValueTable::empty(),
        };
        ProcessGroup::new(vec![entry], None, None).unwrap()
    }

    // §8 scenario 5: counted acceptance over many draws.
    #[test]
    fn integral_xs_rejection_matches_scenario_acceptance_rate() {
        let group = group_with_integral_xs();
        let mut rng = PcgEngine(Pcg32::seed_from_u64(42));

        let sigma_max = 1.2;
        let draws = 200_000;

        let mut accepted_easy = 0u32;
        for _ in 0..draws {
            let outcome =
                select_discrete_interaction(&group, MaterialId::new(0), 0.1, false, &[sigma_max], &mut rng);
            if matches!(outcome, SelectionOutcome::Selected { .. }) {
                accepted_easy += 1;
            }
        }
        let rate_easy = f64::from(accepted_easy) / f64::from(draws);
        assert!((rate_easy - 1.0).abs() < 0.01, "rate={rate_easy}");

        let mut accepted_hard = 0u32;
        for _ in 0..draws {
            let outcome = select_discrete_interaction(
                &group,
                MaterialId::new(0),
                0.11,
                false,
                &[sigma_max],
                &mut rng,
            );
            if matches!(outcome, SelectionOutcome::Selected { .. }) {
                accepted_hard += 1;
            }
        }
        let rate_hard = f64::from(accepted_hard) / f64::from(draws);
        let expected = 1979.0 / (1650.0 * 1.2);
        assert!((rate_hard - expected).abs() < 0.01, "rate={rate_hard} expected={expected}");
    }

    #[test]
    fn at_rest_particle_selects_at_rest_process() {
        let grid = UniformLogGrid::new(0.1, 10.0, 2).unwrap();
        let xs = ScaledXsGrid::no_scaling(grid, vec![1.0, 1.0]).unwrap();
        let entry = ProcessEntry {
            process: ProcessId::new(7),
            models: ModelGroup::new(vec![(0.0, f64::INFINITY, crate::ids::ParticleModelId::new(3))])
                .unwrap(),
            macro_xs: ValueTable::new(vec![Some(xs)]),
            integral_xs: None,
            element_cdf: ValueTable::empty(),
        };
        let group =
            ProcessGroup::new(vec![entry], None, Some(ParticleProcessId::new(0))).unwrap();
        let mut rng = PcgEngine(Pcg32::seed_from_u64(1));

        let outcome = select_discrete_interaction(&group, MaterialId::new(0), 0.0, true, &[0.0], &mut rng);
        assert_eq!(
            outcome,
            SelectionOutcome::Selected {
                process: ParticleProcessId::new(0),
                model: crate::ids::ParticleModelId::new(3),
                element: None,
            }
        );
    }
}
