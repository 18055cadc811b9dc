//! eta-sim: hybrid thermal/electric race-vehicle simulation.
//!
//! Provides:
//! - centrifugal clutch and longitudinal force model
//! - energy/phase controller as a pure transition function
//! - adaptive Dormand-Prince integration with terminal events
//! - resampling of the per-evaluation diagnostic trace onto the output grid
//! - `simulate` / `simulate_batch` entry points
//!
//! Tables are borrowed from an immutable [`eta_tables::TableBundle`]; every
//! run owns its own state, controller context and trace, so runs may execute
//! concurrently.

pub mod clutch;
pub mod controller;
pub mod error;
pub mod events;
pub mod forces;
pub mod integrator;
pub mod model;
pub mod params;
pub mod phase;
pub mod resample;
pub mod result;
pub mod run;
pub mod sim;
pub mod trace;
pub mod vehicle;

pub use clutch::{ClutchEngagement, ClutchParameters};
pub use controller::{ControllerConfig, ControllerContext, ControllerInputs, MotorMode};
pub use error::{SimError, SimResult};
pub use forces::{ForceBreakdown, ForceModel};
pub use integrator::DormandPrince45;
pub use model::TransientModel;
pub use params::{
    BrakingParameters, ControllerThresholds, EngineDynamics, EnvironmentFlags, FuelEquivalence,
    StorageParameters, VehicleCoefficients, VehicleParameters,
};
pub use phase::{MAX_PHASE_SPEED, PhaseBounds, PhaseProgress, PhaseTable};
pub use result::{ForceChannels, RunSummary, SimulationResult, Termination};
pub use run::{RunRequest, simulate, simulate_batch};
pub use sim::{SimRecord, SolverOptions, SolverStats, StopReason, run_sim};
pub use trace::{Channel, DiagnosticSample, DiagnosticTrace};
pub use vehicle::{SimulationState, VehicleModel};
