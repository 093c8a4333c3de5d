//! Magnetic-field propagation (§4.2): ODE state, interchangeable
//! integrators, the adaptive substepper, and the boundary-aware
//! propagator.

pub mod equation;
pub mod integrators;
pub mod options;
pub mod propagator;
pub mod substepper;
pub mod types;
pub mod util;

pub use equation::{MagFieldEquation, MagneticField, UniformField, UniformZField};
pub use integrators::{DormandPrinceIntegrator, Integrator, RungeKuttaIntegrator, ZHelixIntegrator};
pub use options::FieldDriverOptions;
pub use propagator::{FieldPropagator, PropagationResult};
pub use substepper::FieldSubstepper;
pub use types::{FieldIntegration, OdeState, Substep};
