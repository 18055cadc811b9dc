//! Scenario file schema.

use std::path::{Path, PathBuf};

use eta_sim::{
    ControllerThresholds, EnvironmentFlags, PhaseBounds, RunRequest, SolverOptions,
    VehicleCoefficients, VehicleParameters,
};
use serde::{Deserialize, Serialize};

/// One run described on disk: the strategy, the vehicle set-up and a
/// pointer to the table file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    pub distance_m: f64,
    pub time_limit_s: f64,
    pub phases: Vec<PhaseDef>,
    /// Table file, relative to the scenario file unless absolute.
    pub tables: PathBuf,
    #[serde(default)]
    pub diagnostics: bool,
    #[serde(default)]
    pub environment: EnvironmentFlags,
    #[serde(default)]
    pub coefficients: VehicleCoefficients,
    #[serde(default)]
    pub vehicle: VehicleParameters,
    #[serde(default)]
    pub thresholds: ControllerThresholds,
    #[serde(default)]
    pub solver: SolverOptions,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhaseDef {
    pub min_mps: f64,
    pub max_mps: f64,
}

impl From<PhaseDef> for PhaseBounds {
    fn from(def: PhaseDef) -> Self {
        PhaseBounds::new(def.min_mps, def.max_mps)
    }
}

impl From<PhaseBounds> for PhaseDef {
    fn from(bounds: PhaseBounds) -> Self {
        Self {
            min_mps: bounds.speed_min,
            max_mps: bounds.speed_max,
        }
    }
}

impl Scenario {
    /// Scenario with reference settings for every optional section.
    pub fn new(
        name: impl Into<String>,
        distance_m: f64,
        time_limit_s: f64,
        phases: Vec<PhaseDef>,
        tables: impl Into<PathBuf>,
    ) -> Self {
        Self {
            version: crate::LATEST_VERSION,
            name: name.into(),
            distance_m,
            time_limit_s,
            phases,
            tables: tables.into(),
            diagnostics: false,
            environment: EnvironmentFlags::default(),
            coefficients: VehicleCoefficients::default(),
            vehicle: VehicleParameters::default(),
            thresholds: ControllerThresholds::default(),
            solver: SolverOptions::default(),
        }
    }

    pub fn to_request(&self) -> RunRequest {
        RunRequest {
            total_distance_m: self.distance_m,
            phases: self.phases.iter().copied().map(PhaseBounds::from).collect(),
            time_limit_s: self.time_limit_s,
            environment: self.environment.clone(),
            coefficients: self.coefficients.clone(),
            diagnostics: self.diagnostics,
            vehicle: self.vehicle.clone(),
            thresholds: self.thresholds.clone(),
            solver: self.solver.clone(),
        }
    }

    /// Location of the table file for a scenario read from `scenario_path`.
    pub fn tables_path(&self, scenario_path: &Path) -> PathBuf {
        if self.tables.is_absolute() {
            return self.tables.clone();
        }
        match scenario_path.parent() {
            Some(dir) => dir.join(&self.tables),
            None => self.tables.clone(),
        }
    }
}
