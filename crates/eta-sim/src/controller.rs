//! Energy and phase controller.
//!
//! A state machine evaluated once per right-hand-side call. It decides which
//! motor drives, arms forced braking before the finish line, captures
//! regenerated energy and drains the supercapacitor. The transition function
//! is pure: it consumes a [`ControllerContext`] and returns the next one, so
//! it can be exercised without running the integrator.
//!
//! Transitions, in priority order:
//! 1. forced-braking arming when the remaining distance falls inside the
//!    braking envelope needed to recover the storage gap
//! 2. regenerative capture while braking is armed
//! 3. electric restart at low speed
//! 4. electric exhaustion hands over to the thermal engine (once per run)
//! 5. phase boundaries start and stop the thermal engine
//! 6. storage drain while the electric motor drives

use serde::{Deserialize, Serialize};

use crate::params::{BrakingParameters, ControllerThresholds, StorageParameters};
use crate::phase::{PhaseProgress, PhaseTable};

/// Which motor, if any, is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotorMode {
    #[default]
    None,
    Thermal,
    Electric,
}

impl MotorMode {
    #[inline]
    pub fn is_thermal(self) -> bool {
        self == MotorMode::Thermal
    }

    #[inline]
    pub fn is_electric(self) -> bool {
        self == MotorMode::Electric
    }
}

/// Controller state carried across evaluations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControllerContext {
    pub phases: PhaseProgress,
    pub mode: MotorMode,
    pub braking_forced: bool,
    pub regen_completed: bool,
    pub restart_completed: bool,
    /// Supercapacitor energy (J), always within `[0, capacity]`.
    pub stored_energy: f64,
    /// Storage level forced braking tries to restore (J).
    pub baseline_energy: f64,
    pub last_time: f64,
    pub last_velocity: f64,
    /// Cumulative on-board electrical consumption (J).
    pub electrical_energy_consumed: f64,
}

/// Immutable inputs to the transition function.
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig<'a> {
    pub phases: &'a PhaseTable,
    pub storage: &'a StorageParameters,
    pub braking: &'a BrakingParameters,
    pub thresholds: &'a ControllerThresholds,
    pub mass_kg: f64,
    pub electric_enabled: bool,
}

/// Per-evaluation measurements.
#[derive(Debug, Clone, Copy)]
pub struct ControllerInputs {
    pub time: f64,
    pub velocity: f64,
    pub position: f64,
    pub distance_to_finish: f64,
    /// Mechanical power (W) the electric motor delivers if it drives now.
    pub electric_drive_power: f64,
}

impl ControllerContext {
    pub fn new(phase_count: usize, storage: &StorageParameters) -> Self {
        Self {
            phases: PhaseProgress::new(phase_count),
            mode: MotorMode::None,
            braking_forced: false,
            regen_completed: false,
            restart_completed: false,
            stored_energy: storage.initial_energy_j,
            baseline_energy: storage.initial_energy_j,
            last_time: 0.0,
            last_velocity: 0.0,
            electrical_energy_consumed: 0.0,
        }
    }

    /// Energy regeneration must recover to get back to the baseline (J).
    #[inline]
    pub fn energy_gap(&self) -> f64 {
        (self.baseline_energy - self.stored_energy).max(0.0)
    }

    /// Advance the state machine by one evaluation.
    ///
    /// Energy is only integrated over forward time: solver stages that
    /// revisit an earlier instant see `dt = 0` and do not move
    /// `last_time`/`last_velocity`.
    pub fn step(mut self, cfg: &ControllerConfig<'_>, input: &ControllerInputs) -> Self {
        let th = cfg.thresholds;
        let v = input.velocity;
        let forward = input.time >= self.last_time;
        let dt = if forward {
            input.time - self.last_time
        } else {
            0.0
        };
        let was_thermal = self.mode.is_thermal();

        self.arm_forced_braking(cfg, input.distance_to_finish);

        if self.braking_forced && !self.regen_completed {
            if v > th.regen_cutoff_mps {
                if forward {
                    let kinetic_loss =
                        0.5 * cfg.mass_kg * (self.last_velocity * self.last_velocity - v * v);
                    let recovered = cfg.storage.regen_efficiency * kinetic_loss.max(0.0);
                    self.stored_energy = (self.stored_energy + recovered).min(cfg.storage.capacity_j);
                }
            } else {
                self.regen_completed = true;
            }
        }

        if cfg.electric_enabled
            && v < th.restart_speed_mps
            && self.stored_energy > 0.0
            && !self.restart_completed
        {
            self.mode = MotorMode::Electric;
        }

        if self.mode.is_electric() && self.stored_energy <= 0.0 {
            self.mode = MotorMode::Thermal;
            self.restart_completed = true;
        }

        self.update_phase(cfg, v);

        if self.mode.is_electric() && v > th.drain_min_speed_mps {
            let used = input.electric_drive_power * dt / cfg.storage.discharge_efficiency;
            self.stored_energy = (self.stored_energy - used).clamp(0.0, cfg.storage.capacity_j);
        }

        self.electrical_energy_consumed += cfg.storage.passive_load_w * dt;
        if self.mode.is_thermal() && !was_thermal {
            self.electrical_energy_consumed += cfg.storage.restart_energy_j;
        }

        if forward {
            self.last_time = input.time;
            self.last_velocity = v;
        }
        self
    }

    fn arm_forced_braking(&mut self, cfg: &ControllerConfig<'_>, distance_to_finish: f64) {
        let gap = self.energy_gap();
        if cfg.thresholds.rearm_forced_braking && self.braking_forced && gap <= 0.0 {
            self.braking_forced = false;
            self.regen_completed = false;
        }
        if self.braking_forced || gap <= 0.0 {
            return;
        }
        let envelope = gap
            / cfg.storage.regen_efficiency
            / (cfg.mass_kg * cfg.braking.max_deceleration_mps2);
        if distance_to_finish <= envelope * cfg.braking.envelope_margin {
            self.braking_forced = true;
        }
    }

    fn update_phase(&mut self, cfg: &ControllerConfig<'_>, v: f64) {
        let i = self.phases.current;
        let Some(bounds) = cfg.phases.get(i) else {
            return;
        };
        if self.phases.completed[i] {
            return;
        }

        // The motion guard keeps the thermal engine off while an electric
        // launch is still possible.
        let launch_pending =
            cfg.electric_enabled && !self.restart_completed && self.stored_energy > 0.0;
        let moving = v > cfg.thresholds.min_motion_mps || !launch_pending;

        if v <= bounds.speed_min && self.mode == MotorMode::None && !self.phases.started[i] && moving
        {
            self.mode = MotorMode::Thermal;
            self.phases.started[i] = true;
        } else if v >= bounds.speed_max && self.mode.is_thermal() {
            self.mode = MotorMode::None;
            self.phases.completed[i] = true;
            if i + 1 < cfg.phases.len() {
                self.phases.current += 1;
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::phase::PhaseBounds;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn invariants_hold_for_arbitrary_speed_traces(
            speeds in prop::collection::vec(0.0_f64..14.0, 1..200),
            powers in prop::collection::vec(-50.0_f64..400.0, 200),
            distances in prop::collection::vec(0.0_f64..200.0, 200),
            electric_enabled in any::<bool>(),
        ) {
            let phases = PhaseTable::new(vec![
                PhaseBounds::new(0.0, 8.0),
                PhaseBounds::new(6.0, 9.0),
                PhaseBounds::new(5.5, 8.5),
            ]).unwrap();
            let storage = StorageParameters::default();
            let braking = BrakingParameters::default();
            let thresholds = ControllerThresholds::default();
            let cfg = ControllerConfig {
                phases: &phases,
                storage: &storage,
                braking: &braking,
                thresholds: &thresholds,
                mass_kg: 224.0,
                electric_enabled,
            };

            let mut ctx = ControllerContext::new(phases.len(), &storage);
            let mut last_phase = 0;
            let mut last_consumed = 0.0;
            let mut completed = vec![false; phases.len()];
            for (i, v) in speeds.iter().enumerate() {
                let input = ControllerInputs {
                    time: i as f64 * 0.05,
                    velocity: *v,
                    position: 0.0,
                    distance_to_finish: distances[i],
                    electric_drive_power: powers[i],
                };
                ctx = ctx.step(&cfg, &input);

                prop_assert!(ctx.stored_energy >= 0.0 && ctx.stored_energy <= storage.capacity_j);
                prop_assert!(ctx.phases.current >= last_phase);
                prop_assert!(ctx.phases.current < phases.len());
                prop_assert!(ctx.electrical_energy_consumed >= last_consumed);
                for (was, now) in completed.iter().zip(&ctx.phases.completed) {
                    prop_assert!(!*was || *now);
                }
                if !electric_enabled {
                    prop_assert!(!ctx.mode.is_electric());
                }
                last_phase = ctx.phases.current;
                last_consumed = ctx.electrical_energy_consumed;
                completed = ctx.phases.completed.clone();
            }
        }
    }
}
