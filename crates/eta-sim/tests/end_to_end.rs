//! Integration test: full run on the reference track.
//!
//! Checks the reference strategy finishes inside the time limit and that
//! the reported series respect the controller invariants.

mod common;

use common::{reference_request, reference_tables};
use eta_sim::{MotorMode, PhaseTable, SimError, Termination, simulate};

#[test]
fn reference_strategy_finishes_in_time() {
    let tables = reference_tables();
    let request = reference_request();
    let result = simulate(&request, &tables).unwrap();
    let s = &result.summary;

    assert_eq!(s.termination, Termination::DistanceReached);
    assert!(s.reached_finish);
    assert!(s.total_time_s < request.time_limit_s);
    assert!((s.total_distance_m - 1321.0).abs() < 1e-3);
    assert!(s.fuel_g > 0.0);
    assert!(s.total_fuel_ml > 0.0);
    assert!(s.electrical_energy_j > 0.0);
    assert!(s.mean_speed_mps > 0.0);
    assert!(s.km_per_litre.is_some());

    // every channel lives on the same grid
    let n = result.len();
    assert!(n > 2);
    for series in [
        &result.position,
        &result.velocity,
        &result.engine_rpm,
        &result.cvt_ratio,
        &result.fuel_g,
        &result.stored_energy_j,
        &result.electrical_energy_j,
        &result.forces.aero,
        &result.forces.wind,
        &result.thermal_active,
    ] {
        assert_eq!(series.len(), n);
    }
    assert_eq!(result.motor_mode.len(), n);

    assert!(result.time.windows(2).all(|w| w[1] > w[0]));
    assert!(result.position.windows(2).all(|w| w[1] >= w[0] - 1e-9));
}

#[test]
fn reported_series_respect_controller_invariants() {
    let tables = reference_tables();
    let request = reference_request();
    let result = simulate(&request, &tables).unwrap();
    let capacity = request.vehicle.storage.capacity_j;

    for e in &result.stored_energy_j {
        assert!(*e >= -1e-9 && *e <= capacity + 1e-9, "stored energy {e}");
    }
    for (th, el) in result.thermal_active.iter().zip(&result.electric_active) {
        assert!(th + el <= 1.0 + 1e-9);
    }
    // launch is electric, the engine takes over later
    assert_eq!(result.motor_mode[1], MotorMode::Electric);
    assert!(result.motor_mode.contains(&MotorMode::Thermal));
    assert!(result.summary.phases_completed <= 1);
}

#[test]
fn disabling_aero_zeroes_the_aero_channel() {
    let tables = reference_tables();
    let mut request = reference_request();
    request.environment.aero_enabled = false;
    let result = simulate(&request, &tables).unwrap();
    assert!(result.forces.aero.iter().all(|f| *f == 0.0));
    assert!(result.summary.total_time_s > 0.0);
}

#[test]
fn inverted_phase_bounds_are_rejected_before_integration() {
    let tables = reference_tables();
    let mut request = reference_request();
    request.phases = vec![(9.0, 8.0).into()];
    request.diagnostics = true;
    let err = simulate(&request, &tables).unwrap_err();
    assert!(matches!(err, SimError::InvalidPhaseTable { .. }));

    // the phase table is what a VehicleModel borrows, and it cannot be built,
    // so no model runs and no diagnostic sample is recorded
    assert!(matches!(
        request.validate(),
        Err(SimError::InvalidPhaseTable { .. })
    ));
    assert!(PhaseTable::new(request.phases.clone()).is_err());
}

#[test]
fn empty_phase_table_is_rejected() {
    let tables = reference_tables();
    let mut request = reference_request();
    request.phases.clear();
    assert!(matches!(
        simulate(&request, &tables),
        Err(SimError::InvalidPhaseTable { .. })
    ));
}

#[test]
fn short_time_limit_reports_an_unfinished_run() {
    let tables = reference_tables();
    let mut request = reference_request();
    request.time_limit_s = 15.0;
    let result = simulate(&request, &tables).unwrap();
    let s = &result.summary;
    assert_eq!(s.termination, Termination::TimeLimit);
    assert!(!s.reached_finish);
    assert_eq!(s.total_time_s, 15.0);
    assert!(s.total_distance_m < 1321.0);
    assert!(s.total_distance_m > 0.0);
}

#[test]
fn repeated_runs_are_bit_identical() {
    let tables = reference_tables();
    let mut request = reference_request();
    request.total_distance_m = 400.0;
    let a = simulate(&request, &tables).unwrap();
    let b = simulate(&request, &tables).unwrap();
    assert_eq!(a, b);
}

#[test]
fn wind_changes_the_outcome() {
    let tables = reference_tables();
    let mut request = reference_request();
    request.total_distance_m = 400.0;
    let calm = simulate(&request, &tables).unwrap();

    request.environment.wind_enabled = true;
    request.environment.wind_speed_mps = 5.0;
    let windy = simulate(&request, &tables).unwrap();

    assert!(calm.forces.wind.iter().all(|f| *f == 0.0));
    assert!(windy.forces.wind.iter().any(|f| *f != 0.0));
    assert_ne!(calm.summary.total_time_s, windy.summary.total_time_s);
}
