//! Physics registry, step limiting, discrete selection, interaction
//! application, and pre-step initialization (§4.3–§4.7).

pub mod apply;
pub mod cutoff;
pub mod prestep;
pub mod registry;
pub mod select;
pub mod step_limit;

pub use apply::{apply_interaction, Interaction, InteractionKind, Secondary};
pub use cutoff::{CutoffParams, CutoffView};
pub use prestep::pre_step;
pub use registry::{
    estimate_sigma_max, scaled_step_limit, ActionLayout, ElementCdf, HardwiredIds,
    IntegralXsProcess, ModelGroup, ProcessEntry, ProcessGroup, RangeTables, ValueTable,
};
pub use select::{select_discrete_interaction, SelectionOutcome};
pub use step_limit::{calculate_step_limit, StepLimit, StepLimitAction};
