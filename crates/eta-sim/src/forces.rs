//! Longitudinal force model.
//!
//! Sign convention: every channel is the force on the vehicle along the
//! direction of travel, except the resistances (`aero`, `rolling`,
//! `gravity`) which are stored as magnitudes opposing motion and subtracted
//! by the dynamics.
//!
//! ```text
//! k        = chain / cvt · η_chain · η_transmission / r_wheel
//! F_motor  = τ_clutch · k        (clutch slipping and transmitting)
//!          = τ_engine · k        (otherwise, when positive)
//! F_aero   = ½ · Cd · A · ρ · v²
//! F_roll   = Crr · m · g
//! F_grav   = m · g · sin(θ(s))
//! F_wind   = ½ · Cx(β) · A · ρ · w∥² · sign(w∥)
//! ```

use eta_core::units::{rad_per_s_to_rpm, rpm_to_rad_per_s};
use eta_tables::TableBundle;

use crate::controller::MotorMode;
use crate::params::{EnvironmentFlags, VehicleParameters};

/// Per-evaluation force channels (N).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceBreakdown {
    pub motor: f64,
    pub electric: f64,
    pub aero: f64,
    pub rolling: f64,
    pub gravity: f64,
    pub wind: f64,
    pub braking: f64,
}

/// Thermal powertrain operating point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThermalDrive {
    pub rpm: f64,
    /// Engine output torque (N·m), zero unless the thermal motor drives.
    pub torque: f64,
    pub cvt_ratio: f64,
    /// Torque passed through a slipping clutch (N·m).
    pub transmitted_torque: f64,
    /// Wheel force from the engine (N).
    pub force: f64,
}

/// Electric motor operating point at the current wheel speed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElectricDrive {
    pub rpm: f64,
    /// Wheel force the motor delivers if it drives (N).
    pub force: f64,
}

/// Borrowed view over everything the force computation reads.
#[derive(Debug, Clone, Copy)]
pub struct ForceModel<'a> {
    pub vehicle: &'a VehicleParameters,
    pub environment: &'a EnvironmentFlags,
    pub tables: &'a TableBundle,
}

impl<'a> ForceModel<'a> {
    pub fn new(
        vehicle: &'a VehicleParameters,
        environment: &'a EnvironmentFlags,
        tables: &'a TableBundle,
    ) -> Self {
        Self {
            vehicle,
            environment,
            tables,
        }
    }

    /// CVT ratio at engine speed `rpm`, or 1 when the CVT is disabled.
    #[inline]
    pub fn cvt_ratio(&self, rpm: f64) -> f64 {
        if self.environment.cvt_enabled {
            self.tables.cvt_ratio.eval(rpm)
        } else {
            1.0
        }
    }

    /// Overall reduction between engine shaft and wheel at a CVT ratio.
    #[inline]
    pub fn overall_ratio(&self, cvt_ratio: f64) -> f64 {
        self.vehicle.chain_ratio() / cvt_ratio
    }

    pub fn thermal_drive(&self, mode: MotorMode, omega: f64, velocity: f64) -> ThermalDrive {
        let v = self.vehicle;
        let rpm = if mode.is_thermal() {
            rad_per_s_to_rpm(omega)
        } else {
            0.0
        };
        let torque = if mode.is_thermal() {
            self.tables.thermal_torque.eval(rpm)
        } else {
            0.0
        };
        let cvt_ratio = self.cvt_ratio(rpm);
        let gain = self.overall_ratio(cvt_ratio) * v.drivetrain_efficiency() / v.wheel_radius_m;

        let effective_ratio = v.primary_chain_ratio
            * v.primary_chain_efficiency
            * (1.0 / cvt_ratio)
            * v.transmission_efficiency
            * v.secondary_chain_ratio
            * v.secondary_chain_efficiency;
        let slip = omega - velocity * effective_ratio / v.wheel_radius_m;
        let transmitted_torque = if slip > 0.0 {
            torque.min(v.clutch.engagement(omega).max_torque)
        } else {
            0.0
        };

        let force = if transmitted_torque > 0.0 {
            transmitted_torque * gain
        } else if torque > 0.0 {
            torque * gain
        } else {
            0.0
        };

        ThermalDrive {
            rpm,
            torque,
            cvt_ratio,
            transmitted_torque,
            force,
        }
    }

    pub fn electric_drive(&self, velocity: f64) -> ElectricDrive {
        let v = self.vehicle;
        let wheel_rpm = rad_per_s_to_rpm(velocity / v.wheel_radius_m);
        let rpm = wheel_rpm * v.electric_gear_ratio;
        let torque = self.tables.electric_torque.eval(rpm);
        ElectricDrive {
            rpm,
            force: torque * v.electric_gear_ratio / v.wheel_radius_m,
        }
    }

    #[inline]
    pub fn aero(&self, velocity: f64) -> f64 {
        if !self.environment.aero_enabled {
            return 0.0;
        }
        let v = self.vehicle;
        0.5 * v.drag_coefficient * v.frontal_area_m2 * v.air_density_kg_m3 * velocity * velocity
    }

    #[inline]
    pub fn rolling(&self) -> f64 {
        let v = self.vehicle;
        v.rolling_coefficient * v.mass_kg * v.gravity_mps2
    }

    #[inline]
    pub fn gravity(&self, position: f64) -> f64 {
        if !self.environment.gravity_enabled {
            return 0.0;
        }
        let v = self.vehicle;
        v.mass_kg * v.gravity_mps2 * self.tables.track.slope_angle(position).sin()
    }

    /// Force from the along-track wind component at `position`.
    ///
    /// Positive pushes the vehicle forward (tailwind).
    pub fn wind(&self, position: f64) -> f64 {
        let env = self.environment;
        if !env.wind_enabled {
            return 0.0;
        }
        let heading = self.tables.track.heading(position);
        let (wx, wy) = (
            env.wind_speed_mps * env.wind_angle_global_rad.cos(),
            env.wind_speed_mps * env.wind_angle_global_rad.sin(),
        );
        let along = wx * heading.cos() + wy * heading.sin();
        let relative = wrap_angle(wy.atan2(wx) - heading);
        let cx = self.tables.drag_coefficient.eval(relative.to_degrees().abs());

        let v = self.vehicle;
        0.5 * cx * v.frontal_area_m2 * v.air_density_kg_m3 * along * along * along.signum()
    }

    /// Forced-braking force, negative while armed and moving.
    #[inline]
    pub fn braking(&self, armed: bool, velocity: f64, min_speed: f64) -> f64 {
        if armed && velocity > min_speed {
            -self.vehicle.mass_kg * self.vehicle.braking.max_deceleration_mps2
        } else {
            0.0
        }
    }

    /// Thermal fuel mass flow (g/s) at an operating point, never negative.
    pub fn fuel_rate(&self, drive: &ThermalDrive) -> f64 {
        let power_w = rpm_to_rad_per_s(drive.rpm) * drive.torque;
        let csp = self
            .tables
            .thermal_csp
            .eval(drive.rpm.min(self.tables.thermal_rpm_max()));
        (power_w / 1000.0 * csp / 3600.0).max(0.0)
    }
}

/// Wrap an angle to `(-π, π]`.
pub fn wrap_angle(a: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let r = (a + PI).rem_euclid(TAU) - PI;
    if r <= -PI { r + TAU } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eta_tables::{CvtData, DragData, ElectricMotorData, TableSet, ThermalEngineData, TrackData};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn bundle() -> TableBundle {
        let set = TableSet {
            thermal_engine: ThermalEngineData {
                rpm: vec![0.0, 4000.0, 8000.0],
                torque_nm: vec![1.0, 2.0, 1.0],
                csp_g_per_kwh: vec![600.0, 450.0, 600.0],
                torque_scale: 1.0,
                csp_scale: 1.0,
            },
            electric_motor: ElectricMotorData {
                rpm: vec![0.0, 1000.0, 3000.0],
                torque_nm: vec![12.0, 10.0, 2.0],
            },
            cvt: CvtData {
                engine_rpm: vec![0.0, 6000.0],
                ratio: vec![0.5, 1.5],
            },
            track: TrackData {
                distance_m: vec![0.0, 100.0, 200.0],
                elevation_m: vec![0.0, 1.0, 1.0],
                heading_rad: Some(vec![0.0, 0.0, FRAC_PI_2]),
                easting_m: None,
                northing_m: None,
            },
            drag: DragData {
                angle_deg: vec![0.0, 90.0, 180.0],
                cx: vec![0.2, 0.8, 0.3],
            },
        };
        TableBundle::from_set(&set).unwrap()
    }

    #[test]
    fn aero_scales_with_speed_squared_and_can_be_disabled() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let mut env = EnvironmentFlags::default();
        let model = ForceModel::new(&vehicle, &env, &tables);
        let expected = 0.5 * 0.23 * 0.789 * 1.225 * 100.0;
        assert!((model.aero(10.0) - expected).abs() < 1e-12);

        env.aero_enabled = false;
        let model = ForceModel::new(&vehicle, &env, &tables);
        assert_eq!(model.aero(10.0), 0.0);
    }

    #[test]
    fn gravity_follows_slope() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let env = EnvironmentFlags::default();
        let model = ForceModel::new(&vehicle, &env, &tables);
        // segment angles sit at segment starts and are interpolated between
        let uphill = 224.0 * 9.81 * (0.01_f64).atan().sin();
        assert!((model.gravity(0.0) - uphill).abs() < 1e-9);
        let halfway = 224.0 * 9.81 * (0.5 * 0.01_f64.atan()).sin();
        assert!((model.gravity(50.0) - halfway).abs() < 1e-9);
        assert!(model.gravity(150.0).abs() < 1e-12);
    }

    #[test]
    fn no_thermal_force_without_thermal_mode() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let env = EnvironmentFlags::default();
        let model = ForceModel::new(&vehicle, &env, &tables);
        let drive = model.thermal_drive(MotorMode::Electric, 300.0, 3.0);
        assert_eq!(drive.rpm, 0.0);
        assert_eq!(drive.force, 0.0);
        assert_eq!(model.fuel_rate(&drive), 0.0);
    }

    #[test]
    fn slipping_clutch_limits_transmitted_torque() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let env = EnvironmentFlags::default();
        let model = ForceModel::new(&vehicle, &env, &tables);

        // just above engagement: the clutch passes less than the engine makes
        let omega = vehicle.clutch.engagement_speed() * 1.01;
        let drive = model.thermal_drive(MotorMode::Thermal, omega, 0.0);
        assert!(drive.transmitted_torque > 0.0);
        assert!(drive.transmitted_torque < drive.torque);
        let gain = model.overall_ratio(drive.cvt_ratio) * vehicle.drivetrain_efficiency()
            / vehicle.wheel_radius_m;
        assert!((drive.force - drive.transmitted_torque * gain).abs() < 1e-9);
    }

    #[test]
    fn locked_drive_uses_engine_torque() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let env = EnvironmentFlags::default();
        let model = ForceModel::new(&vehicle, &env, &tables);
        // wheel faster than the engine: no slip, raw torque drives
        let drive = model.thermal_drive(MotorMode::Thermal, 100.0, 20.0);
        assert_eq!(drive.transmitted_torque, 0.0);
        assert!(drive.force > 0.0);
        assert!(model.fuel_rate(&drive) > 0.0);
    }

    #[test]
    fn cvt_disabled_fixes_ratio() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let env = EnvironmentFlags {
            cvt_enabled: false,
            ..EnvironmentFlags::default()
        };
        let model = ForceModel::new(&vehicle, &env, &tables);
        assert_eq!(model.cvt_ratio(5000.0), 1.0);
    }

    #[test]
    fn electric_drive_uses_geared_wheel_speed() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let env = EnvironmentFlags::default();
        let model = ForceModel::new(&vehicle, &env, &tables);
        let at_rest = model.electric_drive(0.0);
        assert_eq!(at_rest.rpm, 0.0);
        assert!((at_rest.force - 12.0 * 1.5 / 0.279).abs() < 1e-9);

        let moving = model.electric_drive(5.0);
        let wheel_rpm = 5.0 / 0.279 * 60.0 / (2.0 * PI);
        assert!((moving.rpm - wheel_rpm * 1.5).abs() < 1e-6);
    }

    #[test]
    fn wind_sign_follows_along_component() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let tail = EnvironmentFlags {
            wind_enabled: true,
            wind_speed_mps: 4.0,
            wind_angle_global_rad: 0.0,
            ..EnvironmentFlags::default()
        };
        let head = EnvironmentFlags {
            wind_angle_global_rad: PI,
            ..tail.clone()
        };
        let f_tail = ForceModel::new(&vehicle, &tail, &tables).wind(10.0);
        let f_head = ForceModel::new(&vehicle, &head, &tables).wind(10.0);
        assert!(f_tail > 0.0);
        assert!(f_head < 0.0);
        let expected_tail = 0.5 * 0.2 * 0.789 * 1.225 * 16.0;
        assert!((f_tail - expected_tail).abs() < 1e-9);
    }

    #[test]
    fn wind_disabled_is_zero() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let env = EnvironmentFlags {
            wind_speed_mps: 10.0,
            ..EnvironmentFlags::default()
        };
        assert_eq!(ForceModel::new(&vehicle, &env, &tables).wind(10.0), 0.0);
    }

    #[test]
    fn braking_only_while_armed_and_moving() {
        let tables = bundle();
        let vehicle = VehicleParameters::default();
        let env = EnvironmentFlags::default();
        let model = ForceModel::new(&vehicle, &env, &tables);
        assert!((model.braking(true, 3.0, 0.002) + 224.0 * 0.4).abs() < 1e-12);
        assert_eq!(model.braking(true, 0.001, 0.002), 0.0);
        assert_eq!(model.braking(false, 3.0, 0.002), 0.0);
    }

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI - 0.5) - (PI - 0.5)).abs() < 1e-12);
        assert!((wrap_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-12);
        assert!((wrap_angle(2.5 * PI) - FRAC_PI_2).abs() < 1e-12);
    }
}
