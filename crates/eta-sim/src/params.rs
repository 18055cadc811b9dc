//! Vehicle, environment and controller parameters.
//!
//! Every struct defaults to the reference Eta-One configuration and
//! deserializes with missing fields taking those defaults.

use eta_core::numeric::{ensure_finite, ensure_fraction, ensure_non_negative, ensure_positive};
use eta_core::units::{grams_to_millilitres, joules_to_fuel_millilitres};
use serde::{Deserialize, Serialize};

use crate::clutch::ClutchParameters;
use crate::error::SimResult;

/// Immutable vehicle description for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParameters {
    pub mass_kg: f64,
    pub wheel_radius_m: f64,
    pub rolling_coefficient: f64,
    pub drag_coefficient: f64,
    pub frontal_area_m2: f64,
    /// Engine-side chain reduction.
    pub primary_chain_ratio: f64,
    /// Wheel-side chain reduction.
    pub secondary_chain_ratio: f64,
    pub primary_chain_efficiency: f64,
    pub secondary_chain_efficiency: f64,
    pub transmission_efficiency: f64,
    pub gravity_mps2: f64,
    pub air_density_kg_m3: f64,
    /// Electric motor speed per wheel speed.
    pub electric_gear_ratio: f64,
    pub clutch: ClutchParameters,
    pub engine: EngineDynamics,
    pub storage: StorageParameters,
    pub braking: BrakingParameters,
    pub fuel: FuelEquivalence,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        Self {
            mass_kg: 224.0,
            wheel_radius_m: 0.279,
            rolling_coefficient: 0.0013,
            drag_coefficient: 0.23,
            frontal_area_m2: 0.789,
            primary_chain_ratio: 95.0 / 11.0,
            secondary_chain_ratio: 2.4,
            primary_chain_efficiency: 0.97,
            secondary_chain_efficiency: 0.97,
            transmission_efficiency: 0.83,
            gravity_mps2: eta_core::units::constants::G0_MPS2,
            air_density_kg_m3: 1.225,
            electric_gear_ratio: 1.5,
            clutch: ClutchParameters::default(),
            engine: EngineDynamics::default(),
            storage: StorageParameters::default(),
            braking: BrakingParameters::default(),
            fuel: FuelEquivalence::default(),
        }
    }
}

impl VehicleParameters {
    /// Fixed chain reduction between engine output and wheel (CVT excluded).
    pub fn chain_ratio(&self) -> f64 {
        self.primary_chain_ratio * self.secondary_chain_ratio
    }

    /// Combined chain and transmission efficiency.
    pub fn drivetrain_efficiency(&self) -> f64 {
        self.primary_chain_efficiency * self.secondary_chain_efficiency * self.transmission_efficiency
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.mass_kg, "mass_kg")?;
        ensure_positive(self.wheel_radius_m, "wheel_radius_m")?;
        ensure_finite(self.rolling_coefficient, "rolling_coefficient")?;
        ensure_finite(self.drag_coefficient, "drag_coefficient")?;
        ensure_finite(self.frontal_area_m2, "frontal_area_m2")?;
        ensure_positive(self.primary_chain_ratio, "primary_chain_ratio")?;
        ensure_positive(self.secondary_chain_ratio, "secondary_chain_ratio")?;
        ensure_fraction(self.primary_chain_efficiency, "primary_chain_efficiency")?;
        ensure_fraction(self.secondary_chain_efficiency, "secondary_chain_efficiency")?;
        ensure_fraction(self.transmission_efficiency, "transmission_efficiency")?;
        ensure_finite(self.gravity_mps2, "gravity_mps2")?;
        ensure_finite(self.air_density_kg_m3, "air_density_kg_m3")?;
        ensure_positive(self.electric_gear_ratio, "electric_gear_ratio")?;
        self.clutch.validate()?;
        self.engine.validate()?;
        self.storage.validate()?;
        self.braking.validate()?;
        self.fuel.validate()?;
        Ok(())
    }
}

/// Engine-speed dynamics constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineDynamics {
    /// Engine-side rotating inertia (kg·m²).
    pub rotor_inertia_kg_m2: f64,
    /// Engine speed approached while freewheeling (rad/s).
    pub idle_speed_rad_s: f64,
    /// First-order rate toward idle while freewheeling (1/s).
    pub idle_return_rate: f64,
    /// First-order decay rate when driven without the thermal engine (1/s).
    pub spin_down_rate: f64,
}

impl Default for EngineDynamics {
    fn default() -> Self {
        Self {
            rotor_inertia_kg_m2: 0.00201,
            idle_speed_rad_s: 10.0,
            idle_return_rate: 20.0,
            spin_down_rate: 0.1,
        }
    }
}

impl EngineDynamics {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.rotor_inertia_kg_m2, "rotor_inertia_kg_m2")?;
        ensure_finite(self.idle_speed_rad_s, "idle_speed_rad_s")?;
        ensure_finite(self.idle_return_rate, "idle_return_rate")?;
        ensure_finite(self.spin_down_rate, "spin_down_rate")?;
        Ok(())
    }
}

/// Supercapacitor storage and on-board electrical loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageParameters {
    pub capacity_j: f64,
    /// Energy at the start of the run; also the braking baseline.
    pub initial_energy_j: f64,
    /// Storage-to-wheel conversion efficiency while motoring.
    pub discharge_efficiency: f64,
    /// Kinetic-to-storage conversion efficiency while braking.
    pub regen_efficiency: f64,
    /// Constant on-board consumption (W).
    pub passive_load_w: f64,
    /// Electrical cost of each thermal engine start (J).
    pub restart_energy_j: f64,
}

impl Default for StorageParameters {
    fn default() -> Self {
        Self {
            capacity_j: 3000.0,
            initial_energy_j: 3000.0,
            discharge_efficiency: 0.6,
            regen_efficiency: 0.6,
            passive_load_w: 21.5,
            restart_energy_j: 400.0,
        }
    }
}

impl StorageParameters {
    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.capacity_j, "capacity_j")?;
        ensure_finite(self.initial_energy_j, "initial_energy_j")?;
        if self.capacity_j < 0.0 || !(0.0..=self.capacity_j).contains(&self.initial_energy_j) {
            return Err(crate::error::SimError::InvalidArg {
                what: "initial_energy_j must lie within [0, capacity_j]",
            });
        }
        ensure_positive(self.discharge_efficiency, "discharge_efficiency")?;
        ensure_fraction(self.discharge_efficiency, "discharge_efficiency")?;
        ensure_positive(self.regen_efficiency, "regen_efficiency")?;
        ensure_fraction(self.regen_efficiency, "regen_efficiency")?;
        // keeps electrical_energy_consumed non-decreasing
        ensure_non_negative(self.passive_load_w, "passive_load_w")?;
        ensure_non_negative(self.restart_energy_j, "restart_energy_j")?;
        Ok(())
    }
}

/// Forced braking near the finish line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrakingParameters {
    pub max_deceleration_mps2: f64,
    /// Multiplier on the theoretical braking distance.
    pub envelope_margin: f64,
}

impl Default for BrakingParameters {
    fn default() -> Self {
        Self {
            max_deceleration_mps2: 0.4,
            envelope_margin: 1.05,
        }
    }
}

impl BrakingParameters {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.max_deceleration_mps2, "max_deceleration_mps2")?;
        ensure_positive(self.envelope_margin, "envelope_margin")?;
        Ok(())
    }
}

/// Conversion of fuel mass and electrical energy into gasoline-equivalent volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelEquivalence {
    pub ethanol_density_kg_m3: f64,
    pub gasoline_density_kg_m3: f64,
    pub ethanol_lhv_kj_per_kg: f64,
    pub gasoline_lhv_kj_per_kg: f64,
    /// Engine efficiency assumed when charging electrically.
    pub engine_efficiency: f64,
    pub alternator_efficiency: f64,
}

impl Default for FuelEquivalence {
    fn default() -> Self {
        Self {
            ethanol_density_kg_m3: 790.0,
            gasoline_density_kg_m3: 750.0,
            ethanol_lhv_kj_per_kg: 26_900.0,
            gasoline_lhv_kj_per_kg: 42_900.0,
            engine_efficiency: 0.25,
            alternator_efficiency: 0.75,
        }
    }
}

impl FuelEquivalence {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.ethanol_density_kg_m3, "ethanol_density_kg_m3")?;
        ensure_positive(self.gasoline_density_kg_m3, "gasoline_density_kg_m3")?;
        ensure_positive(self.ethanol_lhv_kj_per_kg, "ethanol_lhv_kj_per_kg")?;
        ensure_positive(self.gasoline_lhv_kj_per_kg, "gasoline_lhv_kj_per_kg")?;
        ensure_positive(self.engine_efficiency, "engine_efficiency")?;
        ensure_positive(self.alternator_efficiency, "alternator_efficiency")?;
        Ok(())
    }

    /// Ethanol volume (ml) of `grams` burnt.
    pub fn ethanol_ml(&self, grams: f64) -> f64 {
        grams_to_millilitres(grams, self.ethanol_density_kg_m3)
    }

    /// Gasoline volume (ml) releasing the same heat as `grams` of ethanol.
    pub fn thermal_gasoline_ml(&self, grams: f64) -> f64 {
        self.ethanol_ml(grams) * (self.ethanol_lhv_kj_per_kg * self.ethanol_density_kg_m3)
            / (self.gasoline_lhv_kj_per_kg * self.gasoline_density_kg_m3)
    }

    /// Gasoline volume (ml) an engine-driven alternator burns to produce
    /// `joules` of electrical energy.
    pub fn electric_gasoline_ml(&self, joules: f64) -> f64 {
        joules_to_fuel_millilitres(
            joules / self.engine_efficiency / self.alternator_efficiency,
            self.gasoline_lhv_kj_per_kg,
            self.gasoline_density_kg_m3,
        )
    }
}

/// Environment options for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentFlags {
    pub wind_enabled: bool,
    pub wind_speed_mps: f64,
    /// Direction the wind blows toward, in the track's planar frame (rad).
    pub wind_angle_global_rad: f64,
    pub aero_enabled: bool,
    pub gravity_enabled: bool,
    pub cvt_enabled: bool,
    pub electric_motor_enabled: bool,
}

impl Default for EnvironmentFlags {
    fn default() -> Self {
        Self {
            wind_enabled: false,
            wind_speed_mps: 0.0,
            wind_angle_global_rad: 0.0,
            aero_enabled: true,
            gravity_enabled: true,
            cvt_enabled: true,
            electric_motor_enabled: true,
        }
    }
}

impl EnvironmentFlags {
    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.wind_speed_mps, "wind_speed_mps")?;
        ensure_finite(self.wind_angle_global_rad, "wind_angle_global_rad")?;
        Ok(())
    }
}

/// Multipliers on the freewheel-regime resistance terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleCoefficients {
    pub aero_multiplier: f64,
    pub rolling_multiplier: f64,
}

impl Default for VehicleCoefficients {
    fn default() -> Self {
        Self {
            aero_multiplier: 1.63,
            rolling_multiplier: 1.0,
        }
    }
}

impl VehicleCoefficients {
    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.aero_multiplier, "aero_multiplier")?;
        ensure_finite(self.rolling_multiplier, "rolling_multiplier")?;
        Ok(())
    }
}

/// Speed thresholds used by the controller and the dynamics regimes (m/s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerThresholds {
    /// Regeneration ends below this speed.
    pub regen_cutoff_mps: f64,
    /// Electric restart fires below this speed.
    pub restart_speed_mps: f64,
    /// Phase starts require the vehicle to be moving faster than this.
    pub min_motion_mps: f64,
    /// Storage drains only above this speed.
    pub drain_min_speed_mps: f64,
    /// Forced braking force applies only above this speed.
    pub braking_min_speed_mps: f64,
    /// Coasting regime applies above this speed.
    pub freewheel_speed_mps: f64,
    /// Allow forced braking to disarm once storage is back to its baseline
    /// and arm again later in the run.
    pub rearm_forced_braking: bool,
}

impl Default for ControllerThresholds {
    fn default() -> Self {
        Self {
            regen_cutoff_mps: 0.01,
            restart_speed_mps: 0.5,
            min_motion_mps: 0.5,
            drain_min_speed_mps: 0.1,
            braking_min_speed_mps: 0.002,
            freewheel_speed_mps: 1.0,
            rearm_forced_braking: false,
        }
    }
}

impl ControllerThresholds {
    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.regen_cutoff_mps, "regen_cutoff_mps")?;
        ensure_finite(self.restart_speed_mps, "restart_speed_mps")?;
        ensure_finite(self.min_motion_mps, "min_motion_mps")?;
        ensure_finite(self.drain_min_speed_mps, "drain_min_speed_mps")?;
        ensure_finite(self.braking_min_speed_mps, "braking_min_speed_mps")?;
        ensure_finite(self.freewheel_speed_mps, "freewheel_speed_mps")?;
        Ok(())
    }
}
