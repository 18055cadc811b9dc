//! Table sets arrive from external data files; only their in-memory shape matters.

use eta_tables::{TableBundle, TableError, TableSet};

const TABLES_JSON: &str = r#"{
  "thermal_engine": {
    "rpm": [0, 2000, 4000, 6000],
    "torque_nm": [2.0, 3.0, 4.0, 3.0],
    "csp_g_per_kwh": [500, 400, 350, 380],
    "torque_scale": 0.583
  },
  "electric_motor": { "rpm": [0, 1000, 3000], "torque_nm": [12, 10, 3] },
  "cvt": { "engine_rpm": [0, 3000, 6000], "ratio": [0.5, 1.0, 1.8] },
  "track": {
    "distance_m": [0, 50, 100, 150],
    "elevation_m": [10, 10.5, 10, 9.5],
    "easting_m": [0, 50, 100, 150],
    "northing_m": [0, 0, 0, 0]
  },
  "drag": { "angle_deg": [0, 45, 90, 180], "cx": [0.23, 0.3, 0.6, 0.23] }
}"#;

#[test]
fn parses_and_builds_bundle() {
    let set: TableSet = serde_json::from_str(TABLES_JSON).unwrap();
    assert_eq!(set.thermal_engine.csp_scale, 1.0);

    let bundle = TableBundle::try_from(&set).unwrap();
    assert!((bundle.thermal_torque.eval(4000.0) - 4.0 * 0.583).abs() < 1e-12);
    // heading due east derived from planar coordinates
    assert!(bundle.track.heading(75.0).abs() < 1e-12);
    assert_eq!(bundle.track.length(), 150.0);
    // crosswind drag peaks at 90 degrees
    assert!((bundle.drag_coefficient.eval(90.0) - 0.6).abs() < 1e-12);
}

#[test]
fn empty_table_is_rejected_at_construction() {
    let mut set: TableSet = serde_json::from_str(TABLES_JSON).unwrap();
    set.electric_motor.rpm.clear();
    set.electric_motor.torque_nm.clear();
    let err = TableBundle::from_set(&set).unwrap_err();
    assert_eq!(
        err,
        TableError::Empty {
            table: "electric motor torque"
        }
    );
}
