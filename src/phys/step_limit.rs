//! Step-limit calculator (§4.4): combine discrete, continuous (range), and
//! fixed-limiter bounds into one step-limit record per track.
//!
//! Grounded on `original_source/src/celeritas/phys/PhysicsStepUtils.hh`'s
//! `calc_tabulated_physics_step` control flow.

use crate::ids::MaterialId;

use super::registry::{estimate_sigma_max, scaled_step_limit, ProcessGroup};

/// Which built-in action a computed step limit should dispatch to next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepLimitAction {
    /// The discrete-interaction selector should run at the end of this
    /// step (the particle is either stopped or its MFP is exhausted).
    Discrete,
    /// The continuous energy-loss/range limit was shorter than the
    /// discrete-interaction step.
    ElossRange,
    /// A configured `fixed_step_limiter` was shorter than either of the
    /// above.
    FixedLimiter,
    /// No process applies to this particle in this material; it advances
    /// freely until geometry or the field limits it.
    None,
}

/// The outcome of the step-limit calculation (§4.4): the limiting step
/// length, which action it selects, and the per-process macroscopic cross
/// sections computed along the way (reused by the discrete selector,
/// §4.5).
#[derive(Clone, Debug)]
pub struct StepLimit {
    /// The limiting step length.
    pub step: f64,
    /// Which action should run when this step completes.
    pub action: StepLimitAction,
    /// Per-process macroscopic cross section, dense by
    /// [`crate::ids::ParticleProcessId`], as computed at `energy0`.
    pub process_xs: Vec<f64>,
}

/// Compute the step limit for a track at `energy0` with `mfp` remaining
/// mean free paths, in `material`.
///
/// `min_eprime_over_e` is the integral-method safety factor `ξ` (§4.3);
/// `alpha`/`rho` are the scaled step limiter's `max_step_over_range` and
/// `min_range` for this particle's size class (light/heavy, §4.3).
///
/// # Panics
///
/// Panics (debug) if `mfp` is not positive and the particle is not
/// reported stopped.
#[must_use]
pub fn calculate_step_limit(
    process_group: &ProcessGroup,
    material: MaterialId,
    energy0: f64,
    mfp: f64,
    min_eprime_over_e: f64,
    alpha: f64,
    rho: f64,
    fixed_step_limiter: Option<f64>,
    is_stopped: bool,
) -> StepLimit {
    let mut process_xs = Vec::with_capacity(process_group.entries().len());
    let mut sigma = 0.0;
    for entry in process_group.entries() {
        let xs_value = match entry.macro_xs.get(material) {
            None => 0.0,
            Some(grid) => match entry.integral_xs.as_ref().and_then(|ix| ix.e_max_xs(material)) {
                Some(e_max_xs) => estimate_sigma_max(grid, energy0, e_max_xs, min_eprime_over_e),
                None => grid.evaluate(energy0),
            },
        };
        process_xs.push(xs_value);
        sigma += xs_value;
    }

    if is_stopped {
        return StepLimit {
            step: 0.0,
            action: StepLimitAction::Discrete,
            process_xs,
        };
    }

    if process_group.entries().is_empty() {
        return StepLimit {
            step: f64::INFINITY,
            action: StepLimitAction::None,
            process_xs,
        };
    }

    debug_assert!(mfp > 0.0);
    let mut step = mfp / sigma;
    let mut action = StepLimitAction::Discrete;

    if let Some(range_tables) = process_group.range_tables() {
        let eloss_step = scaled_step_limit(range_tables.range(energy0), alpha, rho);
        if eloss_step < step {
            step = eloss_step;
            action = StepLimitAction::ElossRange;
        }
    }

    if let Some(limiter) = fixed_step_limiter {
        if limiter > 0.0 && limiter < step {
            step = limiter;
            action = StepLimitAction::FixedLimiter;
        }
    }

    StepLimit {
        step,
        action,
        process_xs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::uniform::UniformGridRecord;
    use crate::grid::uniform::UniformLogGrid;
    use crate::grid::xs::ScaledXsGrid;
    use crate::ids::ProcessId;
    use crate::phys::registry::{ModelGroup, ProcessEntry, RangeTables, ValueTable};
    use crate::ids::ParticleModelId;

    fn single_process_group(xs_value: f64, range_tables: Option<RangeTables>) -> ProcessGroup {
        let grid = UniformLogGrid::new(1.0, 100.0, 2).unwrap();
        let xs = ScaledXsGrid::no_scaling(grid, vec![xs_value, xs_value]).unwrap();
        let entry = ProcessEntry {
            process: ProcessId::new(0),
            models: ModelGroup::new(vec![(0.0, f64::INFINITY, ParticleModelId::new(0))]).unwrap(),
            macro_xs: ValueTable::new(vec![Some(xs)]),
            integral_xs: None,
            element_cdf: ValueTable::empty(),
        };
        ProcessGroup::new(vec![entry], range_tables, None).unwrap()
    }

    #[test]
    fn discrete_step_from_mfp_over_sigma() {
        let group = single_process_group(2.0, None);
        let limit = calculate_step_limit(&group, MaterialId::new(0), 10.0, 4.0, 0.01, 0.2, 0.1, None, false);
        assert!((limit.step - 2.0).abs() < 1e-9);
        assert_eq!(limit.action, StepLimitAction::Discrete);
    }

    #[test]
    fn stopped_particle_gets_zero_step() {
        let group = single_process_group(2.0, None);
        let limit = calculate_step_limit(&group, MaterialId::new(0), 10.0, 4.0, 0.01, 0.2, 0.1, None, true);
        assert!((limit.step).abs() < 1e-12);
        assert_eq!(limit.action, StepLimitAction::Discrete);
    }

    #[test]
    fn range_limit_overrides_when_shorter() {
        let dedx_grid = UniformLogGrid::new(1.0, 100.0, 2).unwrap();
        let dedx = UniformGridRecord::new(dedx_grid, vec![1000.0, 1000.0], None, 1).unwrap();
        let range_tables = RangeTables::from_dedx(dedx).unwrap();
        // tiny cross section => huge discrete step, so the range limit wins
        let group = single_process_group(1e-6, Some(range_tables));
        let limit = calculate_step_limit(&group, MaterialId::new(0), 10.0, 1.0, 0.01, 0.2, 0.1, None, false);
        assert_eq!(limit.action, StepLimitAction::ElossRange);
        assert!(limit.step < 1e5);
    }

    #[test]
    fn fixed_limiter_overrides_when_shorter() {
        let group = single_process_group(2.0, None);
        let limit = calculate_step_limit(
            &group,
            MaterialId::new(0),
            10.0,
            4.0,
            0.01,
            0.2,
            0.1,
            Some(0.5),
            false,
        );
        assert!((limit.step - 0.5).abs() < 1e-12);
        assert_eq!(limit.action, StepLimitAction::FixedLimiter);
    }

    #[test]
    fn no_applicable_process_advances_freely() {
        let group = ProcessGroup::new(Vec::new(), None, None).unwrap();
        let limit = calculate_step_limit(&group, MaterialId::new(0), 10.0, 4.0, 0.01, 0.2, 0.1, None, false);
        assert_eq!(limit.action, StepLimitAction::None);
        assert!(limit.step.is_infinite());
    }
}
