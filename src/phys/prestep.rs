//! Pre-step initializer (§4.7): per-slot bookkeeping that runs at the start
//! of every step, before the along-step and discrete-selection stages.
//!
//! Grounded on `original_source/src/celeritas/phys/PhysicsStepUtils.hh`'s
//! `initialize_physics_step` (the clear/promote/sample-MFP/compute-limit
//! sequence) and on `track::SecondaryStack` for the thread-zero clear.

use crate::ids::ActionId;
use crate::interfaces::RngEngine;
use crate::rng::sample_exponential;
use crate::track::{TrackState, TrackStatus};

use super::registry::{ActionLayout, ProcessGroup};
use super::step_limit::{calculate_step_limit, StepLimitAction};

/// Run the pre-step initializer on one slot (§4.7). The caller is
/// responsible for clearing the shared secondary stack exactly once, on
/// thread zero, before calling this for any slot.
///
/// `charge` is the track's current charge (used to pick the along-step
/// action); `neutral_action`/`user_action` are the built-in actions for
/// charge-zero and charge-nonzero tracks respectively (the latter folds in
/// the field propagator when one is configured).
///
/// # Panics
///
/// Panics (debug) if called on an inactive or errored slot.
#[allow(clippy::too_many_arguments)]
pub fn pre_step(
    state: &mut TrackState,
    process_group: &ProcessGroup,
    layout: &ActionLayout,
    charge: f64,
    neutral_action: ActionId,
    user_action: ActionId,
    min_eprime_over_e: f64,
    alpha: f64,
    rho: f64,
    fixed_step_limiter: Option<f64>,
    rng: &mut impl RngEngine,
) {
    match state.status {
        TrackStatus::Inactive => {
            state.step = 0.0;
            state.post_step_action = ActionId::null();
            state.along_step_action = ActionId::null();
            return;
        }
        TrackStatus::Errored => return,
        TrackStatus::Initializing | TrackStatus::Alive | TrackStatus::Killed => {}
    }
    debug_assert!(matches!(
        state.status,
        TrackStatus::Initializing | TrackStatus::Alive | TrackStatus::Killed
    ));

    state.clear_step_scratch();

    if state.status == TrackStatus::Initializing {
        state.status = TrackStatus::Alive;
    }

    if state.mfp <= 0.0 {
        state.mfp = sample_exponential(rng);
    }

    let is_stopped = state.energy <= 0.0;
    let limit = calculate_step_limit(
        process_group,
        state.material,
        state.energy,
        state.mfp,
        min_eprime_over_e,
        alpha,
        rho,
        fixed_step_limiter,
        is_stopped,
    );
    state.step = limit.step;
    state.process_xs = limit.process_xs;
    state.post_step_action = match limit.action {
        StepLimitAction::Discrete => layout.discrete_select(),
        StepLimitAction::ElossRange => layout.eloss_range(),
        StepLimitAction::FixedLimiter | StepLimitAction::None => ActionId::null(),
    };

    state.along_step_action = if charge == 0.0 { neutral_action } else { user_action };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::uniform::UniformLogGrid;
    use crate::grid::xs::ScaledXsGrid;
    use crate::ids::{ItemId, MaterialId, ParticleModelId, ProcessId};
    use crate::phys::registry::{ModelGroup, ProcessEntry, ValueTable};

    struct Counter(u32);
    impl RngEngine for Counter {
        fn next_u32(&mut self) -> u32 {
            self.0 = self.0.wrapping_add(1);
            self.0.wrapping_mul(2_654_435_761)
        }
    }

    fn group() -> ProcessGroup {
        let grid = UniformLogGrid::new(1.0, 100.0, 2).unwrap();
        let xs = ScaledXsGrid::no_scaling(grid, vec![2.0, 2.0]).unwrap();
        let entry = ProcessEntry {
            process: ProcessId::new(0),
            models: ModelGroup::new(vec![(0.0, f64::INFINITY, ParticleModelId::new(0))]).unwrap(),
            macro_xs: ValueTable::new(vec![Some(xs)]),
            integral_xs: None,
            element_cdf: ValueTable::empty(),
        };
        ProcessGroup::new(vec![entry], None, None).unwrap()
    }

    fn new_state() -> TrackState {
        let mut state = TrackState::inactive();
        state.status = TrackStatus::Initializing;
        state.material = MaterialId::new(0);
        state.energy = 10.0;
        state
    }

    #[test]
    fn inactive_slot_resets_and_returns() {
        let mut state = TrackState::inactive();
        state.step = 5.0;
        state.post_step_action = ActionId::new(3);
        let layout = ActionLayout::new(ItemId::new(10), 1).unwrap();
        pre_step(
            &mut state,
            &group(),
            &layout,
            0.0,
            ActionId::new(0),
            ActionId::new(1),
            0.01,
            0.2,
            0.1,
            None,
            &mut Counter(0),
        );
        assert!((state.step).abs() < 1e-12);
        assert!(!bool::from(state.post_step_action));
    }

    #[test]
    fn errored_slot_is_skipped() {
        let mut state = TrackState::inactive();
        state.status = TrackStatus::Errored;
        state.step = 7.0;
        let layout = ActionLayout::new(ItemId::new(10), 1).unwrap();
        pre_step(
            &mut state,
            &group(),
            &layout,
            0.0,
            ActionId::new(0),
            ActionId::new(1),
            0.01,
            0.2,
            0.1,
            None,
            &mut Counter(0),
        );
        assert!((state.step - 7.0).abs() < 1e-12);
    }

    #[test]
    fn initializing_slot_is_promoted_to_alive() {
        let mut state = new_state();
        let layout = ActionLayout::new(ItemId::new(10), 1).unwrap();
        pre_step(
            &mut state,
            &group(),
            &layout,
            -1.0,
            ActionId::new(0),
            ActionId::new(1),
            0.01,
            0.2,
            0.1,
            None,
            &mut Counter(0),
        );
        assert_eq!(state.status, TrackStatus::Alive);
    }

    #[test]
    fn zero_mfp_is_resampled_and_step_limit_computed() {
        let mut state = new_state();
        state.mfp = 0.0;
        let layout = ActionLayout::new(ItemId::new(10), 1).unwrap();
        pre_step(
            &mut state,
            &group(),
            &layout,
            -1.0,
            ActionId::new(0),
            ActionId::new(1),
            0.01,
            0.2,
            0.1,
            None,
            &mut Counter(1),
        );
        assert!(state.mfp > 0.0);
        assert!(state.step > 0.0 && state.step.is_finite());
        assert_eq!(state.process_xs, vec![2.0]);
    }

    #[test]
    fn along_step_action_picked_by_charge() {
        let layout = ActionLayout::new(ItemId::new(10), 1).unwrap();
        let neutral = ActionId::new(0);
        let user = ActionId::new(1);

        let mut neutral_state = new_state();
        neutral_state.mfp = 1.0;
        pre_step(
            &mut neutral_state,
            &group(),
            &layout,
            0.0,
            neutral,
            user,
            0.01,
            0.2,
            0.1,
            None,
            &mut Counter(0),
        );
        assert_eq!(neutral_state.along_step_action, neutral);

        let mut charged_state = new_state();
        charged_state.mfp = 1.0;
        pre_step(
            &mut charged_state,
            &group(),
            &layout,
            -1.0,
            neutral,
            user,
            0.01,
            0.2,
            0.1,
            None,
            &mut Counter(0),
        );
        assert_eq!(charged_state.along_step_action, user);
    }
}
