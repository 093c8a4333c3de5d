//! Per-slot track state and the fixed-size track pool (§3, §5).
//!
//! Grounded on `original_source/src/celeritas/track/SimTrackView.hh` (the
//! persistent-vs-reset split of per-slot state) and on `pineappl`'s use of
//! `rayon::par_iter_mut` for bulk, order-independent per-item work
//! (`pineappl_cli/src/pull.rs`), adapted here to "every pipeline stage
//! visits every slot exactly once" (§5).

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::ids::{ActionId, ElementComponentId, MaterialId, ParticleId};

/// Lifecycle state of one track slot (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackStatus {
    /// Slot holds no track; skipped by every stage except the pre-step
    /// reset.
    Inactive,
    /// Slot was just assigned a new track; promoted to `Alive` at the next
    /// pre-step.
    Initializing,
    /// Slot holds a live track that steps normally.
    Alive,
    /// Track was killed (absorbed, or ran off the end of the problem);
    /// the slot is recycled by the caller.
    Killed,
    /// An unrecoverable error occurred; the slot is skipped until the
    /// caller recycles it.
    Errored,
}

/// Per-slot track state (§3): some fields persist across steps, the rest
/// are cleared every pre-step (§4.7).
#[derive(Clone, Debug)]
pub struct TrackState {
    /// Lifecycle state.
    pub status: TrackStatus,
    /// Species.
    pub particle: ParticleId,
    /// Current material.
    pub material: MaterialId,
    /// Kinetic energy (MeV).
    pub energy: f64,
    /// Statistical weight.
    pub weight: f64,
    /// Position.
    pub position: [f64; 3],
    /// Direction (unit vector).
    pub direction: [f64; 3],

    // --- persistent across steps ---
    /// Remaining mean free paths until the next discrete interaction; zero
    /// means "resample at next pre-step".
    pub mfp: f64,
    /// Cached MSC range, reused across steps until invalidated.
    pub msc_range_cache: f64,

    // --- reset every step (§4.7) ---
    /// Total macroscopic cross section computed at pre-step energy.
    pub macro_xs: f64,
    /// Per-process macroscopic cross section scratch, dense by
    /// [`crate::ids::ParticleProcessId`].
    pub process_xs: Vec<f64>,
    /// Local energy deposition accumulated this step.
    pub energy_deposition: f64,
    /// Range at pre-step energy, cached by the step limiter for reuse by
    /// the energy-loss calculation.
    pub dedx_range: f64,
    /// Span of this step's secondaries within the pool's
    /// [`SecondaryStack`].
    pub secondaries: Range<usize>,
    /// Sampled element component, if the selected model varies by
    /// element.
    pub element: Option<ElementComponentId>,
    /// This step's limiting length.
    pub step: f64,
    /// Action to run at the end of this step (null if none applies).
    pub post_step_action: ActionId,
    /// Action to run during this step's along-step motion (null for
    /// inactive/errored slots).
    pub along_step_action: ActionId,
}

impl TrackState {
    /// A freshly reset, inactive slot.
    #[must_use]
    pub fn inactive() -> Self {
        Self {
            status: TrackStatus::Inactive,
            particle: ParticleId::null(),
            material: MaterialId::null(),
            energy: 0.0,
            weight: 1.0,
            position: [0.0; 3],
            direction: [0.0, 0.0, 1.0],
            mfp: 0.0,
            msc_range_cache: 0.0,
            macro_xs: 0.0,
            process_xs: Vec::new(),
            energy_deposition: 0.0,
            dedx_range: 0.0,
            secondaries: 0..0,
            element: None,
            step: 0.0,
            post_step_action: ActionId::null(),
            along_step_action: ActionId::null(),
        }
    }

    /// Clear the per-step scratch fields (§4.7), leaving persistent state
    /// (`mfp`, `msc_range_cache`) and kinematics untouched.
    pub fn clear_step_scratch(&mut self) {
        self.macro_xs = 0.0;
        self.process_xs.clear();
        self.energy_deposition = 0.0;
        self.dedx_range = 0.0;
        self.secondaries = 0..0;
        self.element = None;
        self.step = 0.0;
        self.post_step_action = ActionId::null();
        self.along_step_action = ActionId::null();
    }
}

/// A lock-free bump allocator for the per-state secondary stack (§5): all
/// slots may call [`allocate`](Self::allocate) concurrently; only thread
/// zero calls [`reset`](Self::reset), and only between stages.
#[derive(Debug)]
pub struct SecondaryStack {
    capacity: usize,
    next: AtomicUsize,
}

impl SecondaryStack {
    /// Construct with a fixed capacity (`secondary_stack_factor *
    /// pool_size`, per `PhysicsOptions`).
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next: AtomicUsize::new(0),
        }
    }

    /// Clear the stack back to empty. Must be called by exactly one
    /// thread (thread zero) between stages; no other writer may be active
    /// concurrently.
    pub fn reset(&self) {
        self.next.store(0, Ordering::SeqCst);
    }

    /// Bump-allocate a span of `n` secondary slots, or `None` if the stack
    /// is exhausted (the caller maps this to `Action::failed`, §5, §7).
    #[must_use]
    pub fn allocate(&self, n: usize) -> Option<Range<usize>> {
        if n == 0 {
            return Some(0..0);
        }
        let start = self.next.fetch_add(n, Ordering::SeqCst);
        let end = start + n;
        if end > self.capacity {
            None
        } else {
            Some(start..end)
        }
    }

    /// Current high-water mark.
    #[must_use]
    pub fn len(&self) -> usize {
        self.next.load(Ordering::SeqCst).min(self.capacity)
    }

    /// Whether the stack holds no live secondaries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fixed-size pool of track slots (§5): every pipeline stage is a bulk
/// operation applied to each slot independently, optionally in parallel.
#[derive(Debug)]
pub struct TrackPool {
    slots: Vec<TrackState>,
}

impl TrackPool {
    /// Construct a pool of `size` initially inactive slots.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size).map(|_| TrackState::inactive()).collect(),
        }
    }

    /// Number of slots in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read-only access to every slot.
    #[must_use]
    pub fn slots(&self) -> &[TrackState] {
        &self.slots
    }

    /// Mutable access to every slot.
    pub fn slots_mut(&mut self) -> &mut [TrackState] {
        &mut self.slots
    }

    /// Apply a bulk stage to every slot. Correctness must not depend on
    /// the order slots are visited (§5); `action` runs across a
    /// work-stealing thread pool via `rayon`.
    pub fn apply_bulk<F>(&mut self, action: F)
    where
        F: Fn(&mut TrackState) + Sync + Send,
    {
        self.slots.par_iter_mut().for_each(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_stack_bump_allocates_and_rejects_overflow() {
        let stack = SecondaryStack::new(10);
        let a = stack.allocate(4).unwrap();
        assert_eq!(a, 0..4);
        let b = stack.allocate(4).unwrap();
        assert_eq!(b, 4..8);
        assert!(stack.allocate(4).is_none());
        stack.reset();
        assert!(stack.is_empty());
        assert_eq!(stack.allocate(10).unwrap(), 0..10);
    }

    #[test]
    fn pool_bulk_stage_visits_every_slot() {
        let mut pool = TrackPool::new(100);
        pool.apply_bulk(|slot| slot.energy = 42.0);
        assert!(pool.slots().iter().all(|s| (s.energy - 42.0).abs() < 1e-12));
    }

    #[test]
    fn clear_step_scratch_preserves_persistent_fields() {
        let mut state = TrackState::inactive();
        state.mfp = 3.0;
        state.msc_range_cache = 1.5;
        state.macro_xs = 9.0;
        state.clear_step_scratch();
        assert!((state.mfp - 3.0).abs() < 1e-12);
        assert!((state.msc_range_cache - 1.5).abs() < 1e-12);
        assert!((state.macro_xs).abs() < 1e-12);
    }
}
