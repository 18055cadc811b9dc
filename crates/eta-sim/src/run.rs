//! Simulation entry points.

use eta_tables::TableBundle;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{SimError, SimResult};
use crate::forces::ForceModel;
use crate::params::{ControllerThresholds, EnvironmentFlags, VehicleCoefficients, VehicleParameters};
use crate::phase::{PhaseBounds, PhaseTable};
use crate::result::SimulationResult;
use crate::sim::{SolverOptions, run_sim};
use crate::vehicle::{SimulationState, VehicleModel};

/// Everything one run needs besides the shared tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub total_distance_m: f64,
    pub phases: Vec<PhaseBounds>,
    pub time_limit_s: f64,
    #[serde(default)]
    pub environment: EnvironmentFlags,
    #[serde(default)]
    pub coefficients: VehicleCoefficients,
    /// Log controller transitions at debug level.
    #[serde(default)]
    pub diagnostics: bool,
    #[serde(default)]
    pub vehicle: VehicleParameters,
    #[serde(default)]
    pub thresholds: ControllerThresholds,
    #[serde(default)]
    pub solver: SolverOptions,
}

impl RunRequest {
    /// Request with reference vehicle, environment and solver settings.
    pub fn new(total_distance_m: f64, phases: Vec<PhaseBounds>, time_limit_s: f64) -> Self {
        Self {
            total_distance_m,
            phases,
            time_limit_s,
            environment: EnvironmentFlags::default(),
            coefficients: VehicleCoefficients::default(),
            diagnostics: false,
            vehicle: VehicleParameters::default(),
            thresholds: ControllerThresholds::default(),
            solver: SolverOptions::default(),
        }
    }

    /// Check every input and build the phase table.
    pub fn validate(&self) -> SimResult<PhaseTable> {
        if !self.total_distance_m.is_finite() || self.total_distance_m <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "total distance must be positive",
            });
        }
        if !self.time_limit_s.is_finite() || self.time_limit_s <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "time limit must be positive",
            });
        }
        let phases = PhaseTable::new(self.phases.clone())?;
        self.vehicle.validate()?;
        self.environment.validate()?;
        self.coefficients.validate()?;
        self.thresholds.validate()?;
        self.solver.validate()?;
        Ok(phases)
    }
}

/// Run one simulation to the finish line or the time limit.
///
/// Reaching the time limit is not an error: the summary reports
/// `reached_finish == false`.
pub fn simulate(request: &RunRequest, tables: &TableBundle) -> SimResult<SimulationResult> {
    let phases = request.validate()?;
    let target = request.total_distance_m;

    let forces = ForceModel::new(&request.vehicle, &request.environment, tables);
    let mut model = VehicleModel::new(
        forces,
        &phases,
        &request.thresholds,
        &request.coefficients,
        target,
    )
    .with_transition_logging(request.diagnostics);

    let finish = |_t: f64, x: &SimulationState| x.position() - target;
    let record = run_sim(&mut model, request.time_limit_s, &finish, &request.solver)?;

    let t_final = record.t.last().copied().unwrap_or(0.0);
    let (ctx, trace) = model.into_parts();
    if t_final <= 0.0 || trace.is_empty() {
        return Err(SimError::NoSamplesProduced { t: t_final });
    }

    let result = SimulationResult::assemble(target, &request.vehicle.fuel, &record, &ctx, &trace)?;
    let s = &result.summary;
    info!(
        time_s = s.total_time_s,
        distance_m = s.total_distance_m,
        total_fuel_ml = s.total_fuel_ml,
        phases_completed = s.phases_completed,
        rhs_evals = result.stats.rhs_evals,
        "simulation finished"
    );
    if !s.reached_finish {
        warn!(
            time_limit_s = request.time_limit_s,
            distance_m = s.total_distance_m,
            target_m = target,
            "time limit reached before the finish line"
        );
    }
    Ok(result)
}

/// Run independent requests in parallel over one shared table bundle.
///
/// Results are returned in request order.
pub fn simulate_batch(
    requests: &[RunRequest],
    tables: &TableBundle,
) -> Vec<SimResult<SimulationResult>> {
    requests.par_iter().map(|r| simulate(r, tables)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let req = RunRequest::new(1321.0, vec![PhaseBounds::new(6.0, 8.5)], 189.0);
        assert!(req.environment.aero_enabled);
        assert!(!req.environment.wind_enabled);
        assert!(!req.diagnostics);
        assert_eq!(req.validate().unwrap().len(), 1);
    }

    #[test]
    fn rejects_bad_distance_and_time() {
        let phases = vec![PhaseBounds::new(6.0, 8.5)];
        assert!(RunRequest::new(0.0, phases.clone(), 10.0).validate().is_err());
        assert!(RunRequest::new(10.0, phases.clone(), f64::NAN).validate().is_err());
        assert!(RunRequest::new(10.0, phases, -1.0).validate().is_err());
    }

    #[test]
    fn request_from_partial_json() {
        let req: RunRequest = serde_json::from_str(
            r#"{
                "total_distance_m": 500.0,
                "phases": [{"speed_min": 5.0, "speed_max": 8.0}],
                "time_limit_s": 100.0,
                "environment": {"cvt_enabled": false}
            }"#,
        )
        .unwrap();
        assert!(!req.environment.cvt_enabled);
        assert_eq!(req.solver.max_step, 0.005);
        assert_eq!(req.vehicle.mass_kg, 224.0);
    }
}
