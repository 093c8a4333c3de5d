//! Physics registry (§4.3): per-particle process/model catalog, action id
//! layout, the integral cross-section estimator, per-material element
//! CDFs, and the scaled step limiter.
//!
//! Grounded on `original_source/src/celeritas/phys/PhysicsParams.cc` (model
//! build, action assignment, hardwired-model bookkeeping) and
//! `original_source/src/celeritas/random/TabulatedElementSelector.hh` (the
//! element CDF).

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::grid::range::{range_from_dedx, InverseRangeCalculator, RangeCalculator};
use crate::grid::uniform::UniformGridRecord;
use crate::grid::util::linear_interpolate;
use crate::grid::xs::ScaledXsGrid;
use crate::ids::{markers, ItemId, MaterialId, ModelId, ParticleModelId, ParticleProcessId, ProcessId};

/// A sparse table of `T`, one optional entry per [`MaterialId`]; an absent
/// entry means "not applicable in this material" (§3).
#[derive(Clone, Debug, Default)]
pub struct ValueTable<T> {
    entries: Vec<Option<T>>,
}

impl<T> ValueTable<T> {
    /// An empty table: not applicable anywhere.
    #[must_use]
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Construct from a dense per-material vector of optional entries.
    #[must_use]
    pub fn new(entries: Vec<Option<T>>) -> Self {
        Self { entries }
    }

    /// The entry for `material`, if any.
    #[must_use]
    pub fn get(&self, material: MaterialId) -> Option<&T> {
        material
            .get()
            .and_then(|i| self.entries.get(i))
            .and_then(Option::as_ref)
    }

    /// Whether this table has no applicable entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }
}

/// Per-(process, material) peak of the tabulated cross section, used by the
/// integral method (§4.3).
#[derive(Clone, Debug)]
pub struct IntegralXsProcess {
    e_max_xs: ValueTable<f64>,
}

impl IntegralXsProcess {
    /// Construct from a dense per-material vector of peak energies.
    #[must_use]
    pub fn new(e_max_xs: Vec<Option<f64>>) -> Self {
        Self {
            e_max_xs: ValueTable::new(e_max_xs),
        }
    }

    /// The energy of the maximum tabulated cross section in `material`.
    #[must_use]
    pub fn e_max_xs(&self, material: MaterialId) -> Option<f64> {
        self.e_max_xs.get(material).copied()
    }
}

/// Estimate the over-the-step cross-section peak for the integral method
/// (§4.3): `σ(E_max_xs)` if `ξ·E₀ ≤ E_max_xs < E₀`, else
/// `max(σ(E₀), σ(ξ·E₀))`.
#[must_use]
pub fn estimate_sigma_max(xs: &ScaledXsGrid, e0: f64, e_max_xs: f64, min_eprime_over_e: f64) -> f64 {
    let lo = min_eprime_over_e * e0;
    if lo <= e_max_xs && e_max_xs < e0 {
        xs.evaluate(e_max_xs)
    } else {
        xs.evaluate(e0).max(xs.evaluate(lo))
    }
}

/// One contiguous, energy-sorted set of model applicability windows for a
/// single process within a single particle's [`ProcessGroup`] (§3, §4.3).
///
/// Invariant: `N >= 1` windows, each `[energy[k], energy[k+1])`, covering
/// `energy[0] ..= energy[N]` with no gaps.
#[derive(Clone, Debug)]
pub struct ModelGroup {
    energy: Vec<f64>,
    models: Vec<ParticleModelId>,
    combined: Vec<bool>,
}

impl ModelGroup {
    /// Construct from `(energy_lo, energy_hi, model)` triples. Triples are
    /// sorted by `energy_lo`; the resulting windows must be contiguous
    /// (each `energy_hi` must equal the next window's `energy_lo`).
    pub fn new(mut windows: Vec<(f64, f64, ParticleModelId)>) -> Result<Self> {
        if windows.is_empty() {
            return Err(Error::general("a process must declare at least one model"));
        }
        windows.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut energy = vec![windows[0].0];
        let mut models = Vec::with_capacity(windows.len());
        for (lo, hi, model) in &windows {
            if !(*hi > *lo) {
                return Err(Error::general(
                    "model applicability window must have hi > lo",
                ));
            }
            if (*energy.last().unwrap() - lo).abs() > 1e-12 {
                return Err(Error::general(
                    "model applicability windows must be contiguous in energy",
                ));
            }
            energy.push(*hi);
            models.push(*model);
        }
        let combined = vec![false; models.len()];
        Ok(Self { energy, models, combined })
    }

    /// Mark the given models as forbidding multi-element materials (§9(c)):
    /// a combined model (e.g. combined Seltzer-Berger + relativistic
    /// bremsstrahlung) whose micro cross sections aren't built per element.
    #[must_use]
    pub fn with_combined_models(mut self, models: &[ParticleModelId]) -> Self {
        for (model, flag) in self.models.iter().zip(self.combined.iter_mut()) {
            if models.contains(model) {
                *flag = true;
            }
        }
        self
    }

    /// Whether any model in this group forbids multi-element materials.
    #[must_use]
    pub fn forbids_multi_element(&self) -> bool {
        self.combined.iter().any(|&c| c)
    }

    /// Number of models.
    #[must_use]
    pub fn num_models(&self) -> usize {
        self.models.len()
    }

    /// The model whose window covers `e`, clamped to the group's range.
    #[must_use]
    pub fn find_model(&self, e: f64) -> ParticleModelId {
        let i = crate::grid::util::locate_bin(&self.energy, e);
        self.models[i]
    }
}

/// Per-material cumulative distribution over a material's element
/// components, built from per-element microscopic cross sections tabulated
/// on a shared energy grid (§4.3).
#[derive(Clone, Debug)]
pub struct ElementCdf {
    energies: Vec<f64>,
    // row-major: cdf[bin * num_components + component]
    cdf: Vec<f64>,
    num_components: usize,
}

impl ElementCdf {
    /// Build from per-component microscopic cross sections, one row per
    /// energy bin (`component_xs[bin][component]`). Each row is normalized
    /// to a cumulative distribution summing to 1 in place.
    pub fn new(energies: Vec<f64>, mut component_xs: Vec<Vec<f64>>) -> Result<Self> {
        if energies.len() != component_xs.len() {
            return Err(Error::general(
                "element CDF energy grid length must match the number of rows",
            ));
        }
        let num_components = component_xs.first().map_or(0, Vec::len);
        if num_components == 0 {
            return Err(Error::general("element CDF needs at least one component"));
        }
        let mut cdf = Vec::with_capacity(energies.len() * num_components);
        for row in &mut component_xs {
            if row.len() != num_components {
                return Err(Error::general(
                    "every element CDF row must have the same number of components",
                ));
            }
            let total: f64 = row.iter().sum();
            if !(total > 0.0) {
                return Err(Error::general(
                    "element CDF row must have a positive total cross section",
                ));
            }
            let mut running = 0.0;
            for xs in row.iter_mut() {
                running += *xs / total;
                cdf.push(running);
            }
            // force the last entry exactly to 1 to avoid a stray rejection
            // from accumulated rounding error
            *cdf.last_mut().unwrap() = 1.0;
        }
        Ok(Self {
            energies,
            cdf,
            num_components,
        })
    }

    fn row(&self, bin: usize) -> &[f64] {
        &self.cdf[bin * self.num_components..(bin + 1) * self.num_components]
    }

    /// Number of element components this CDF distinguishes.
    #[must_use]
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Interpolated CDF value for `component` at energy `e`.
    fn interpolated(&self, component: usize, e: f64) -> f64 {
        if e <= self.energies[0] {
            return self.row(0)[component];
        }
        let last = self.energies.len() - 1;
        if e >= self.energies[last] {
            return self.row(last)[component];
        }
        let i = crate::grid::util::locate_bin(&self.energies, e);
        linear_interpolate(
            self.energies[i],
            self.row(i)[component],
            self.energies[i + 1],
            self.row(i + 1)[component],
            e,
        )
    }

    /// Sample an element component at energy `e` given `u ~ U(0, 1)`:
    /// the first component whose interpolated CDF exceeds `u`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `u` is outside `[0, 1]`.
    #[must_use]
    pub fn sample(&self, e: f64, u: f64) -> ItemId<markers::ElementComponent> {
        debug_assert!((0.0..=1.0).contains(&u));
        for component in 0..self.num_components {
            if self.interpolated(component, e) > u {
                return ItemId::new(component);
            }
        }
        ItemId::new(self.num_components - 1)
    }
}

/// `R[0] = 2·E[0]/(dE/dx)[0]`-seeded range and inverse-range tables built
/// from a particle's `dE/dx` grid (§4.1, §4.3).
#[derive(Clone, Debug)]
pub struct RangeTables {
    energy_loss: UniformGridRecord,
    range: RangeCalculator,
    inverse_range: InverseRangeCalculator,
}

impl RangeTables {
    /// Integrate the range table from a `dE/dx` grid and build both
    /// calculators from it.
    pub fn from_dedx(energy_loss: UniformGridRecord) -> Result<Self> {
        let range_values = range_from_dedx(&energy_loss)?;
        let range = RangeCalculator::new(energy_loss.grid().clone(), range_values.clone())?;
        let inverse_range =
            InverseRangeCalculator::new(energy_loss.grid().clone(), range_values, None)?;
        Ok(Self {
            energy_loss,
            range,
            inverse_range,
        })
    }

    /// The underlying `dE/dx` grid.
    #[must_use]
    pub const fn energy_loss(&self) -> &UniformGridRecord {
        &self.energy_loss
    }

    /// The range at energy `e`.
    #[must_use]
    pub fn range(&self, e: f64) -> f64 {
        self.range.evaluate(e)
    }

    /// The energy a particle would have after travelling range `r`.
    ///
    /// # Errors
    ///
    /// See [`InverseRangeCalculator::evaluate`].
    pub fn inverse_range(&self, r: f64) -> Result<f64> {
        self.inverse_range.evaluate(r)
    }
}

/// `α·R + ρ·(1−α)·(2 − ρ/R)` when `R ≥ ρ`, else `R` (§4.3). `α` is
/// `max_step_over_range`, `ρ` is `min_range`.
///
/// # Panics
///
/// Panics (debug) if `range` is not positive.
#[must_use]
pub fn scaled_step_limit(range: f64, alpha: f64, rho: f64) -> f64 {
    debug_assert!(range > 0.0);
    if range >= rho {
        alpha.mul_add(range, rho * (1.0 - alpha) * (2.0 - rho / range))
    } else {
        range
    }
}

/// One process entry within a [`ProcessGroup`]: its model catalog, optional
/// integral-XS peak table, per-material macroscopic cross section, and
/// optional per-material element CDF.
#[derive(Clone, Debug)]
pub struct ProcessEntry {
    /// The process id.
    pub process: ProcessId,
    /// The models this process owns, by energy window.
    pub models: ModelGroup,
    /// The macroscopic cross section, per material.
    pub macro_xs: ValueTable<ScaledXsGrid>,
    /// Integral-method peak table, present only if this process uses the
    /// integral method.
    pub integral_xs: Option<IntegralXsProcess>,
    /// Per-material element sampling CDF, present only if per-element
    /// cross sections vary across the material's components.
    pub element_cdf: ValueTable<ElementCdf>,
}

/// A small set of models that compute their macroscopic cross section on
/// the fly rather than from a table (§4.3): photoelectric below a tabulated
/// threshold, positron annihilation, neutron elastic.
#[derive(Clone, Copy, Debug, Default)]
pub struct HardwiredIds {
    /// Photoelectric process/model, active below `photoelectric_threshold`.
    pub photoelectric: Option<ModelId>,
    /// Energy below which the photoelectric cross section is computed
    /// on the fly instead of from a table.
    pub photoelectric_threshold: f64,
    /// Positron annihilation model.
    pub positron_annihilation: Option<ModelId>,
    /// Neutron elastic model.
    pub neutron_elastic: Option<ModelId>,
}

/// Index arithmetic mapping model ids to action ids and back (§4.3):
///
/// ```text
/// first_model_action - 4  = msc-range
/// first_model_action - 3  = eloss-range
/// first_model_action - 2  = discrete-select
/// first_model_action - 1  = integral-rejection
/// first_model_action + k  = model k  (0 <= k < num_models)
/// first_model_action + num_models = failure
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ActionLayout {
    first_model_action: u32,
    num_models: usize,
}

impl ActionLayout {
    /// Construct from the first model's action id and the total model
    /// count across every particle.
    ///
    /// # Errors
    ///
    /// Returns an error if `first_model_action` is too small to leave room
    /// for the four built-in actions preceding it.
    pub fn new(first_model_action: ItemId<markers::Action>, num_models: usize) -> Result<Self> {
        let first_model_action = first_model_action
            .get()
            .ok_or_else(|| Error::general("first_model_action must not be null"))?;
        if first_model_action < 4 {
            return Err(Error::general(
                "first_model_action must leave room for the four built-in actions",
            ));
        }
        Ok(Self {
            first_model_action: u32::try_from(first_model_action).unwrap(),
            num_models,
        })
    }

    fn action(index: u32) -> ItemId<markers::Action> {
        ItemId::new(index as usize)
    }

    /// The msc-range built-in action.
    #[must_use]
    pub fn msc_range(&self) -> ItemId<markers::Action> {
        Self::action(self.first_model_action - 4)
    }

    /// The eloss-range built-in action.
    #[must_use]
    pub fn eloss_range(&self) -> ItemId<markers::Action> {
        Self::action(self.first_model_action - 3)
    }

    /// The discrete-select built-in action.
    #[must_use]
    pub fn discrete_select(&self) -> ItemId<markers::Action> {
        Self::action(self.first_model_action - 2)
    }

    /// The integral-rejection built-in action.
    #[must_use]
    pub fn integral_rejection(&self) -> ItemId<markers::Action> {
        Self::action(self.first_model_action - 1)
    }

    /// The action id for model `k` (dense, `0 <= k < num_models`).
    ///
    /// # Panics
    ///
    /// Panics (debug) if `k` is out of range.
    #[must_use]
    pub fn model_action(&self, k: usize) -> ItemId<markers::Action> {
        debug_assert!(k < self.num_models);
        Self::action(self.first_model_action + u32::try_from(k).unwrap())
    }

    /// The sentinel failure action.
    #[must_use]
    pub fn failure(&self) -> ItemId<markers::Action> {
        Self::action(self.first_model_action + u32::try_from(self.num_models).unwrap())
    }

    /// The dense model index `k` that `action` refers to, if it falls
    /// within the model-action range.
    #[must_use]
    pub fn action_to_model(&self, action: ItemId<markers::Action>) -> Option<usize> {
        let index = action.get()? as u32;
        if index < self.first_model_action {
            return None;
        }
        let k = (index - self.first_model_action) as usize;
        (k < self.num_models).then_some(k)
    }
}

/// Per-particle process catalog (§3, §4.3): every applicable process, its
/// model group, macroscopic cross section, optional integral-XS table and
/// element CDF, plus particle-level range tables and an optional at-rest
/// process.
#[derive(Clone, Debug)]
pub struct ProcessGroup {
    entries: Vec<ProcessEntry>,
    by_process: FxHashMap<ProcessId, ParticleProcessId>,
    range_tables: Option<RangeTables>,
    at_rest_process: Option<ParticleProcessId>,
}

impl ProcessGroup {
    /// Construct from a list of process entries and an optional at-rest
    /// process index, validating that at most one energy-loss table and at
    /// most one at-rest process are registered.
    pub fn new(
        entries: Vec<ProcessEntry>,
        range_tables: Option<RangeTables>,
        at_rest_process: Option<ParticleProcessId>,
    ) -> Result<Self> {
        if let Some(idx) = at_rest_process {
            if idx.unchecked_get() >= entries.len() {
                return Err(Error::general("at-rest process index out of range"));
            }
        }
        let mut by_process = FxHashMap::default();
        for (i, entry) in entries.iter().enumerate() {
            if by_process.insert(entry.process, ParticleProcessId::new(i)).is_some() {
                return Err(Error::general("duplicate process in ProcessGroup"));
            }
            if entry.models.forbids_multi_element() {
                if let Some(num_components) = entry
                    .element_cdf
                    .entries
                    .iter()
                    .flatten()
                    .map(ElementCdf::num_components)
                    .find(|&n| n > 1)
                {
                    return Err(Error::general(format!(
                        "process {:?} has a model that forbids multi-element materials, \
                         but its element CDF has {num_components} components",
                        entry.process,
                    )));
                }
            }
        }
        Ok(Self {
            entries,
            by_process,
            range_tables,
            at_rest_process,
        })
    }

    /// All process entries, dense by [`ParticleProcessId`].
    #[must_use]
    pub fn entries(&self) -> &[ProcessEntry] {
        &self.entries
    }

    /// Look up the dense index of `process`, if this particle has it.
    #[must_use]
    pub fn find(&self, process: ProcessId) -> Option<ParticleProcessId> {
        self.by_process.get(&process).copied()
    }

    /// Particle-level range/inverse-range/energy-loss tables, if this
    /// particle has an energy-loss process.
    #[must_use]
    pub const fn range_tables(&self) -> Option<&RangeTables> {
        self.range_tables.as_ref()
    }

    /// The at-rest-applicable process, if any.
    #[must_use]
    pub fn at_rest_process(&self) -> Option<&ProcessEntry> {
        self.at_rest_process.map(|i| &self.entries[i.unchecked_get()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::uniform::UniformLogGrid;

    #[test]
    fn action_layout_round_trips() {
        let layout = ActionLayout::new(ItemId::new(10), 3).unwrap();
        assert_eq!(layout.msc_range().unchecked_get(), 6);
        assert_eq!(layout.eloss_range().unchecked_get(), 7);
        assert_eq!(layout.discrete_select().unchecked_get(), 8);
        assert_eq!(layout.integral_rejection().unchecked_get(), 9);
        for k in 0..3 {
            let action = layout.model_action(k);
            assert_eq!(layout.action_to_model(action), Some(k));
        }
        assert_eq!(layout.failure().unchecked_get(), 13);
        assert_eq!(layout.action_to_model(layout.failure()), None);
    }

    #[test]
    fn action_layout_rejects_too_small_first_action() {
        assert!(ActionLayout::new(ItemId::new(2), 1).is_err());
    }

    #[test]
    fn model_group_finds_contiguous_windows() {
        let group = ModelGroup::new(vec![
            (10.0, 100.0, ParticleModelId::new(0)),
            (0.0, 10.0, ParticleModelId::new(1)),
        ])
        .unwrap();
        assert_eq!(group.find_model(5.0), ParticleModelId::new(1));
        assert_eq!(group.find_model(50.0), ParticleModelId::new(0));
    }

    #[test]
    fn process_group_rejects_combined_model_on_multi_element_material() {
        let combined_model = ParticleModelId::new(0);
        let models = ModelGroup::new(vec![(0.0, f64::INFINITY, combined_model)])
            .unwrap()
            .with_combined_models(&[combined_model]);
        let entry = ProcessEntry {
            process: ProcessId::new(0),
            models,
            macro_xs: ValueTable::empty(),
            integral_xs: None,
            element_cdf: ValueTable::new(vec![Some(
                ElementCdf::new(vec![1.0], vec![vec![1.0, 1.0]]).unwrap(),
            )]),
        };
        assert!(ProcessGroup::new(vec![entry], None, None).is_err());
    }

    #[test]
    fn process_group_allows_combined_model_on_single_element_material() {
        let combined_model = ParticleModelId::new(0);
        let models = ModelGroup::new(vec![(0.0, f64::INFINITY, combined_model)])
            .unwrap()
            .with_combined_models(&[combined_model]);
        let entry = ProcessEntry {
            process: ProcessId::new(0),
            models,
            macro_xs: ValueTable::empty(),
            integral_xs: None,
            element_cdf: ValueTable::new(vec![Some(
                ElementCdf::new(vec![1.0], vec![vec![1.0]]).unwrap(),
            )]),
        };
        assert!(ProcessGroup::new(vec![entry], None, None).is_ok());
    }

    #[test]
    fn model_group_rejects_gaps() {
        let err = ModelGroup::new(vec![
            (0.0, 10.0, ParticleModelId::new(0)),
            (20.0, 30.0, ParticleModelId::new(1)),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn element_cdf_samples_proportionally() {
        // two components, fractions 1:3 at every energy
        let cdf = ElementCdf::new(vec![1.0, 10.0], vec![vec![1.0, 3.0], vec![1.0, 3.0]]).unwrap();
        assert_eq!(cdf.sample(5.0, 0.1).unchecked_get(), 0);
        assert_eq!(cdf.sample(5.0, 0.5).unchecked_get(), 1);
    }

    #[test]
    fn scaled_step_limit_respects_invariant() {
        let step = scaled_step_limit(10.0, 0.2, 1.0);
        assert!(step > 0.0 && step <= 10.0);
        assert!((scaled_step_limit(0.5, 0.2, 1.0) - 0.5).abs() < 1e-12);
    }

    // §8 scenario 5 setup: sigma_max estimation.
    #[test]
    fn integral_xs_estimator_matches_scenario() {
        let grid = UniformLogGrid::new(0.1, 10.0, 2).unwrap();
        let xs = ScaledXsGrid::no_scaling(grid, vec![1.2, 0.6]).unwrap();

        let sigma_max = estimate_sigma_max(&xs, 10.0, 0.1, 0.005);
        assert!((sigma_max - 1.2).abs() < 1e-9);

        let accept_low = xs.evaluate(0.1) / sigma_max;
        assert!((accept_low - 1.0).abs() < 1e-9);

        let accept_high = xs.evaluate(0.11) / sigma_max;
        assert!((accept_high - 1979.0 / (1650.0 * 1.2)).abs() < 1e-6);
    }
}
