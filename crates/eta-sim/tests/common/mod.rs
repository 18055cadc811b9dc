//! Reference tables for end-to-end runs.

#![allow(dead_code)]

use std::f64::consts::TAU;

use eta_sim::{PhaseBounds, RunRequest};
use eta_tables::{
    CvtData, DragData, ElectricMotorData, TableBundle, TableSet, ThermalEngineData, TrackData,
};

/// Gently descending 1.4 km loop.
pub fn reference_tables() -> TableBundle {
    loop_tables(|d| 30.0 - 0.007 * d)
}

/// The reference loop without elevation change, so coasting slows the
/// vehicle down.
pub fn flat_tables() -> TableBundle {
    loop_tables(|_| 30.0)
}

fn loop_tables(elevation_at: impl Fn(f64) -> f64) -> TableBundle {
    let distance: Vec<f64> = (0..=14).map(|i| i as f64 * 100.0).collect();
    let elevation = distance.iter().map(|d| elevation_at(*d)).collect();
    let heading = distance.iter().map(|d| TAU * d / 1400.0).collect();
    let set = TableSet {
        thermal_engine: ThermalEngineData {
            rpm: vec![0.0, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0],
            torque_nm: vec![1.2, 1.6, 2.0, 2.3, 2.4, 2.3, 2.0, 1.5],
            csp_g_per_kwh: vec![900.0, 700.0, 550.0, 480.0, 450.0, 470.0, 520.0, 600.0],
            torque_scale: 1.0,
            csp_scale: 1.0,
        },
        electric_motor: ElectricMotorData {
            rpm: vec![0.0, 500.0, 1000.0, 2000.0, 3000.0],
            torque_nm: vec![12.0, 12.0, 10.0, 6.0, 3.0],
        },
        cvt: CvtData {
            engine_rpm: vec![0.0, 2500.0, 3500.0, 4500.0, 6000.0],
            ratio: vec![0.5, 0.5, 1.0, 1.8, 1.8],
        },
        track: TrackData {
            distance_m: distance,
            elevation_m: elevation,
            heading_rad: Some(heading),
            easting_m: None,
            northing_m: None,
        },
        drag: DragData {
            angle_deg: vec![0.0, 45.0, 90.0, 135.0, 180.0],
            cx: vec![0.23, 0.35, 0.6, 0.35, 0.23],
        },
    };
    TableBundle::from_set(&set).expect("reference tables are valid")
}

pub fn reference_request() -> RunRequest {
    RunRequest::new(1321.0, vec![PhaseBounds::new(6.0, 8.5)], 189.0)
}
