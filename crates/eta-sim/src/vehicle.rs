//! Vehicle longitudinal dynamics as a [`TransientModel`].
//!
//! Two regimes are selected at each evaluation:
//!
//! ```text
//! freewheel (no motor, v > v_coast):
//!   m · dv/dt = -k_roll·F_roll - k_aero·F_aero + F_brake - F_grav + F_wind
//!   dω/dt     = -λ_idle · (ω - ω_idle)
//!
//! driven:
//!   m · dv/dt = F_motor + F_elec - F_aero + F_brake - F_roll - F_grav + F_wind
//!   dω/dt     = (τ_engine - τ_clutch) / (I_rotor + m·r² / N²)   thermal
//!             = -λ_spin · ω                                      otherwise
//! ```
//!
//! where `N` is the overall engine-to-wheel reduction at the current CVT
//! ratio.

use nalgebra::Vector4;
use tracing::debug;

use crate::controller::{ControllerConfig, ControllerContext, ControllerInputs, MotorMode};
use crate::error::{SimError, SimResult};
use crate::forces::{ForceBreakdown, ForceModel};
use crate::model::TransientModel;
use crate::params::{ControllerThresholds, VehicleCoefficients, VehicleParameters};
use crate::phase::PhaseTable;
use crate::trace::{DiagnosticSample, DiagnosticTrace};

/// ODE state: position (m), velocity (m/s), engine speed (rad/s) and
/// cumulative thermal fuel (g).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationState(pub Vector4<f64>);

impl SimulationState {
    pub fn new(position: f64, velocity: f64, engine_speed: f64, fuel_g: f64) -> Self {
        Self(Vector4::new(position, velocity, engine_speed, fuel_g))
    }

    pub fn zeros() -> Self {
        Self(Vector4::zeros())
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.0[0]
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.0[1]
    }

    #[inline]
    pub fn engine_speed(&self) -> f64 {
        self.0[2]
    }

    #[inline]
    pub fn fuel_g(&self) -> f64 {
        self.0[3]
    }
}

/// The hybrid vehicle for one run.
///
/// Owns the controller context and diagnostic trace; borrows everything
/// immutable, so several models can share one table bundle.
pub struct VehicleModel<'a> {
    forces: ForceModel<'a>,
    phases: &'a PhaseTable,
    thresholds: &'a ControllerThresholds,
    coefficients: &'a VehicleCoefficients,
    target_distance: f64,
    log_transitions: bool,
    ctx: ControllerContext,
    trace: DiagnosticTrace,
}

impl<'a> VehicleModel<'a> {
    pub fn new(
        forces: ForceModel<'a>,
        phases: &'a PhaseTable,
        thresholds: &'a ControllerThresholds,
        coefficients: &'a VehicleCoefficients,
        target_distance: f64,
    ) -> Self {
        let ctx = ControllerContext::new(phases.len(), &forces.vehicle.storage);
        Self {
            forces,
            phases,
            thresholds,
            coefficients,
            target_distance,
            log_transitions: false,
            ctx,
            trace: DiagnosticTrace::new(),
        }
    }

    /// Emit a `debug!` event for every controller transition.
    pub fn with_transition_logging(mut self, enabled: bool) -> Self {
        self.log_transitions = enabled;
        self
    }

    pub fn context(&self) -> &ControllerContext {
        &self.ctx
    }

    pub fn trace(&self) -> &DiagnosticTrace {
        &self.trace
    }

    pub fn into_parts(self) -> (ControllerContext, DiagnosticTrace) {
        (self.ctx, self.trace)
    }

    fn vehicle(&self) -> &'a VehicleParameters {
        self.forces.vehicle
    }

    fn controller_config(&self) -> ControllerConfig<'a> {
        let vehicle = self.vehicle();
        ControllerConfig {
            phases: self.phases,
            storage: &vehicle.storage,
            braking: &vehicle.braking,
            thresholds: self.thresholds,
            mass_kg: vehicle.mass_kg,
            electric_enabled: self.forces.environment.electric_motor_enabled,
        }
    }

    fn log_changes(&self, t: f64, before: &ControllerContext) {
        let after = &self.ctx;
        if after.mode != before.mode {
            debug!(t, from = ?before.mode, to = ?after.mode, "motor mode changed");
        }
        if after.phases.current != before.phases.current {
            debug!(t, phase = after.phases.current, "advanced to next phase");
        }
        for (i, (was, now)) in before.phases.started.iter().zip(&after.phases.started).enumerate() {
            if now != was {
                debug!(t, phase = i, "phase started");
            }
        }
        for (i, (was, now)) in before
            .phases
            .completed
            .iter()
            .zip(&after.phases.completed)
            .enumerate()
        {
            if now != was {
                debug!(t, phase = i, "phase completed");
            }
        }
        if after.braking_forced != before.braking_forced {
            debug!(
                t,
                armed = after.braking_forced,
                stored_energy = after.stored_energy,
                "forced braking changed"
            );
        }
        if after.regen_completed && !before.regen_completed {
            debug!(t, stored_energy = after.stored_energy, "regeneration complete");
        }
    }
}

impl TransientModel for VehicleModel<'_> {
    type State = SimulationState;

    fn initial_state(&self) -> SimulationState {
        SimulationState::zeros()
    }

    fn rhs(&mut self, t: f64, x: &SimulationState) -> SimResult<SimulationState> {
        let (pos, v, omega) = (x.position(), x.velocity(), x.engine_speed());

        // Past the finish the state freezes so event location lands on it.
        if pos >= self.target_distance {
            self.trace.push(DiagnosticSample::finished(t, &self.ctx));
            return Ok(SimulationState::zeros());
        }

        let fm = self.forces;
        let vehicle = self.vehicle();
        let th = self.thresholds;
        let electric = fm.electric_drive(v);

        let inputs = ControllerInputs {
            time: t,
            velocity: v,
            position: pos,
            distance_to_finish: self.target_distance - pos,
            electric_drive_power: electric.force * v,
        };
        let cfg = self.controller_config();
        if self.log_transitions {
            let before = self.ctx.clone();
            self.ctx = before.clone().step(&cfg, &inputs);
            self.log_changes(t, &before);
        } else {
            self.ctx = std::mem::take(&mut self.ctx).step(&cfg, &inputs);
        }

        let mode = self.ctx.mode;
        let thermal = fm.thermal_drive(mode, omega, v);
        let breakdown = ForceBreakdown {
            motor: thermal.force,
            electric: if mode.is_electric() { electric.force } else { 0.0 },
            aero: fm.aero(v),
            rolling: fm.rolling(),
            gravity: fm.gravity(pos),
            wind: fm.wind(pos),
            braking: fm.braking(self.ctx.braking_forced, v, th.braking_min_speed_mps),
        };
        let m = vehicle.mass_kg;
        let freewheel = mode == MotorMode::None && v > th.freewheel_speed_mps;

        let (mut dv, domega) = if freewheel {
            let c = self.coefficients;
            let net = -c.rolling_multiplier * breakdown.rolling - c.aero_multiplier * breakdown.aero
                + breakdown.braking
                - breakdown.gravity
                + breakdown.wind;
            let engine = &vehicle.engine;
            (net / m, -engine.idle_return_rate * (omega - engine.idle_speed_rad_s))
        } else {
            let net = breakdown.motor + breakdown.electric - breakdown.aero + breakdown.braking
                - breakdown.rolling
                - breakdown.gravity
                + breakdown.wind;
            let domega = if mode.is_thermal() {
                let n = fm.overall_ratio(thermal.cvt_ratio);
                let r = vehicle.wheel_radius_m;
                let inertia = vehicle.engine.rotor_inertia_kg_m2 + m * r * r / (n * n);
                (thermal.torque - thermal.transmitted_torque) / inertia
            } else {
                -vehicle.engine.spin_down_rate * omega
            };
            (net / m, domega)
        };
        if v <= 0.0 && dv < 0.0 {
            dv = 0.0;
        }
        let fuel_rate = fm.fuel_rate(&thermal);

        self.trace.push(DiagnosticSample {
            time: t,
            forces: breakdown,
            engine_rpm: thermal.rpm,
            electric_rpm: electric.rpm,
            cvt_ratio: thermal.cvt_ratio,
            stored_energy: self.ctx.stored_energy,
            electrical_energy: self.ctx.electrical_energy_consumed,
            mode,
            freewheel,
        });

        let dxdt = SimulationState::new(v, dv, domega, fuel_rate);
        if dxdt.0.iter().any(|d| !d.is_finite()) {
            return Err(SimError::NonFinite {
                what: "state derivative",
                t,
            });
        }
        Ok(dxdt)
    }

    fn add(&self, a: &SimulationState, b: &SimulationState) -> SimulationState {
        SimulationState(a.0 + b.0)
    }

    fn scale(&self, a: &SimulationState, scale: f64) -> SimulationState {
        SimulationState(a.0 * scale)
    }

    fn components<'s>(&self, x: &'s SimulationState) -> &'s [f64] {
        x.0.as_slice()
    }
}
