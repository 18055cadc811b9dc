//! The flat result record of one run.

use eta_core::units::mps_to_kmh;
use serde::{Deserialize, Serialize};

use crate::controller::{ControllerContext, MotorMode};
use crate::error::SimResult;
use crate::params::FuelEquivalence;
use crate::resample::resample_trace;
use crate::sim::{SimRecord, SolverStats, StopReason};
use crate::trace::{Channel, DiagnosticTrace};
use crate::vehicle::SimulationState;

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    DistanceReached,
    /// The time limit fired first; the strategy was too slow.
    TimeLimit,
}

/// Force channels on the output grid (N).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ForceChannels {
    pub motor: Vec<f64>,
    pub electric: Vec<f64>,
    pub aero: Vec<f64>,
    pub rolling: Vec<f64>,
    pub gravity: Vec<f64>,
    pub wind: Vec<f64>,
    pub braking: Vec<f64>,
}

/// Scalar outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub termination: Termination,
    pub reached_finish: bool,
    pub target_distance_m: f64,
    pub total_time_s: f64,
    pub total_distance_m: f64,
    pub mean_speed_mps: f64,
    pub mean_speed_kmh: f64,
    /// Thermal fuel burnt (g of ethanol).
    pub fuel_g: f64,
    pub ethanol_ml: f64,
    /// Gasoline-equivalent of the thermal fuel (ml).
    pub thermal_fuel_ml: f64,
    pub electrical_energy_j: f64,
    /// Gasoline-equivalent of the electrical consumption (ml).
    pub electric_fuel_ml: f64,
    pub total_fuel_ml: f64,
    /// `None` when no fuel-equivalent was consumed.
    pub km_per_litre: Option<f64>,
    pub final_stored_energy_j: f64,
    pub phases_completed: usize,
}

/// Time series on the solver's output grid plus the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub time: Vec<f64>,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub engine_rpm: Vec<f64>,
    pub electric_rpm: Vec<f64>,
    pub cvt_ratio: Vec<f64>,
    pub fuel_g: Vec<f64>,
    /// Gasoline-equivalent thermal fuel (ml).
    pub fuel_ml: Vec<f64>,
    pub stored_energy_j: Vec<f64>,
    pub electrical_energy_j: Vec<f64>,
    pub forces: ForceChannels,
    /// Fraction of the neighbouring evaluations with the thermal motor on.
    pub thermal_active: Vec<f64>,
    pub electric_active: Vec<f64>,
    pub freewheel: Vec<f64>,
    pub motor_mode: Vec<MotorMode>,
    pub summary: RunSummary,
    pub stats: SolverStats,
}

impl SimulationResult {
    pub(crate) fn assemble(
        target_distance: f64,
        fuel: &FuelEquivalence,
        record: &SimRecord<SimulationState>,
        ctx: &ControllerContext,
        trace: &DiagnosticTrace,
    ) -> SimResult<Self> {
        let time = record.t.clone();
        let position: Vec<f64> = record.x.iter().map(|x| x.position()).collect();
        let velocity: Vec<f64> = record.x.iter().map(|x| x.velocity()).collect();
        let fuel_g: Vec<f64> = record.x.iter().map(|x| x.fuel_g()).collect();
        let fuel_ml = fuel_g.iter().map(|g| fuel.thermal_gasoline_ml(*g)).collect();

        let mut channels = resample_trace(trace, &time)?;
        let fraction = |v: Vec<f64>| -> Vec<f64> { v.into_iter().map(|f| f.clamp(0.0, 1.0)).collect() };
        let thermal_active = fraction(channels.take(Channel::ThermalActive));
        let electric_active = fraction(channels.take(Channel::ElectricActive));
        let freewheel = fraction(channels.take(Channel::Freewheel));
        let motor_mode = thermal_active
            .iter()
            .zip(&electric_active)
            .map(|(th, el)| {
                if *th > 0.5 {
                    MotorMode::Thermal
                } else if *el > 0.5 {
                    MotorMode::Electric
                } else {
                    MotorMode::None
                }
            })
            .collect();

        let forces = ForceChannels {
            motor: channels.take(Channel::MotorForce),
            electric: channels.take(Channel::ElectricForce),
            aero: channels.take(Channel::AeroForce),
            rolling: channels.take(Channel::RollingForce),
            gravity: channels.take(Channel::GravityForce),
            wind: channels.take(Channel::WindForce),
            braking: channels.take(Channel::BrakingForce),
        };

        let summary = summarize(target_distance, fuel, record, ctx);
        Ok(Self {
            time,
            position,
            velocity,
            engine_rpm: channels.take(Channel::EngineRpm),
            electric_rpm: channels.take(Channel::ElectricRpm),
            cvt_ratio: channels.take(Channel::CvtRatio),
            fuel_g,
            fuel_ml,
            stored_energy_j: channels.take(Channel::StoredEnergy),
            electrical_energy_j: channels.take(Channel::ElectricalEnergy),
            forces,
            thermal_active,
            electric_active,
            freewheel,
            motor_mode,
            summary,
            stats: record.stats,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

fn summarize(
    target_distance: f64,
    fuel: &FuelEquivalence,
    record: &SimRecord<SimulationState>,
    ctx: &ControllerContext,
) -> RunSummary {
    let total_time_s = record.t.last().copied().unwrap_or(0.0);
    let last = record.x.last().copied().unwrap_or_default();
    let total_distance_m = last.position();
    let termination = match record.stop {
        StopReason::Event => Termination::DistanceReached,
        StopReason::EndTime => Termination::TimeLimit,
    };

    let fuel_g = last.fuel_g();
    let thermal_fuel_ml = fuel.thermal_gasoline_ml(fuel_g);
    let electrical_energy_j = ctx.electrical_energy_consumed;
    let electric_fuel_ml = fuel.electric_gasoline_ml(electrical_energy_j);
    let total_fuel_ml = thermal_fuel_ml + electric_fuel_ml;
    let mean_speed_mps = if total_time_s > 0.0 {
        total_distance_m / total_time_s
    } else {
        0.0
    };

    RunSummary {
        termination,
        reached_finish: termination == Termination::DistanceReached,
        target_distance_m: target_distance,
        total_time_s,
        total_distance_m,
        mean_speed_mps,
        mean_speed_kmh: mps_to_kmh(mean_speed_mps),
        fuel_g,
        ethanol_ml: fuel.ethanol_ml(fuel_g),
        thermal_fuel_ml,
        electrical_energy_j,
        electric_fuel_ml,
        total_fuel_ml,
        // km per litre == m per ml
        km_per_litre: (total_fuel_ml > 0.0).then(|| total_distance_m / total_fuel_ml),
        final_stored_energy_j: ctx.stored_energy,
        phases_completed: ctx.phases.completed_count(),
    }
}
