//! Property tests over randomized strategies and environment flags.

mod common;

use common::reference_tables;
use eta_sim::{PhaseBounds, RunRequest, simulate};
use proptest::prelude::*;

fn phase_table() -> impl Strategy<Value = Vec<PhaseBounds>> {
    prop::collection::vec((3.0_f64..7.0, 0.5_f64..3.0), 1..4).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(min, width)| PhaseBounds::new(min, min + width))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn invariants_hold_for_random_strategies(
        phases in phase_table(),
        aero in any::<bool>(),
        gravity in any::<bool>(),
        cvt in any::<bool>(),
        electric in any::<bool>(),
        wind in any::<bool>(),
        wind_angle in 0.0_f64..std::f64::consts::TAU,
    ) {
        let tables = reference_tables();
        let mut request = RunRequest::new(250.0, phases.clone(), 60.0);
        request.environment.aero_enabled = aero;
        request.environment.gravity_enabled = gravity;
        request.environment.cvt_enabled = cvt;
        request.environment.electric_motor_enabled = electric;
        request.environment.wind_enabled = wind;
        request.environment.wind_speed_mps = 3.0;
        request.environment.wind_angle_global_rad = wind_angle;

        let result = simulate(&request, &tables).unwrap();
        let capacity = request.vehicle.storage.capacity_j;

        for e in &result.stored_energy_j {
            prop_assert!(*e >= -1e-9 && *e <= capacity + 1e-9);
        }
        for (th, el) in result.thermal_active.iter().zip(&result.electric_active) {
            prop_assert!(th + el <= 1.0 + 1e-9);
        }
        prop_assert!(result.summary.phases_completed <= phases.len());
        prop_assert!(result.electrical_energy_j.windows(2).all(|w| w[1] >= w[0] - 1e-6));
        if !aero {
            prop_assert!(result.forces.aero.iter().all(|f| *f == 0.0));
        }
        if !electric {
            prop_assert!(result.electric_active.iter().all(|f| *f == 0.0));
        }
        if result.summary.reached_finish {
            prop_assert!((result.summary.total_distance_m - 250.0).abs() < 1e-3);
        } else {
            prop_assert_eq!(result.summary.total_time_s, 60.0);
        }
    }
}
