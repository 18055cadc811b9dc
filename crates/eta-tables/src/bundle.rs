//! The immutable table bundle shared by every simulation run.

use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};
use crate::lookup::LookupTable;
use crate::track::TrackProfile;

fn unit_scale() -> f64 {
    1.0
}

/// Thermal engine dyno data keyed by engine speed (rpm).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThermalEngineData {
    pub rpm: Vec<f64>,
    pub torque_nm: Vec<f64>,
    pub csp_g_per_kwh: Vec<f64>,
    /// Calibration multiplier applied to `torque_nm`.
    #[serde(default = "unit_scale")]
    pub torque_scale: f64,
    /// Calibration multiplier applied to `csp_g_per_kwh`.
    #[serde(default = "unit_scale")]
    pub csp_scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElectricMotorData {
    pub rpm: Vec<f64>,
    pub torque_nm: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CvtData {
    pub engine_rpm: Vec<f64>,
    pub ratio: Vec<f64>,
}

/// Track samples. Heading is taken from `heading_rad` when present,
/// otherwise derived from `easting_m`/`northing_m`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackData {
    pub distance_m: Vec<f64>,
    pub elevation_m: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_rad: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easting_m: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub northing_m: Option<Vec<f64>>,
}

/// Drag coefficient vs. relative wind angle (degrees, 0 = head-on).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DragData {
    pub angle_deg: Vec<f64>,
    pub cx: Vec<f64>,
}

/// Raw, serializable form of the five datasets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSet {
    pub thermal_engine: ThermalEngineData,
    pub electric_motor: ElectricMotorData,
    pub cvt: CvtData,
    pub track: TrackData,
    pub drag: DragData,
}

/// Validated lookup tables for one vehicle on one track.
#[derive(Clone, Debug, PartialEq)]
pub struct TableBundle {
    /// Engine torque (N·m) vs. engine speed (rpm), calibration applied.
    pub thermal_torque: LookupTable,
    /// Specific consumption (g/kWh) vs. engine speed (rpm), calibration applied.
    pub thermal_csp: LookupTable,
    /// Motor torque (N·m) vs. motor speed (rpm).
    pub electric_torque: LookupTable,
    /// CVT ratio vs. engine speed (rpm).
    pub cvt_ratio: LookupTable,
    pub track: TrackProfile,
    /// Drag coefficient vs. relative wind angle (deg).
    pub drag_coefficient: LookupTable,
}

impl TableBundle {
    pub fn from_set(set: &TableSet) -> TableResult<Self> {
        let engine = &set.thermal_engine;
        let thermal_torque = LookupTable::new(
            "thermal engine torque",
            engine.rpm.clone(),
            engine.torque_nm.clone(),
        )?
        .scaled(engine.torque_scale);
        let thermal_csp = LookupTable::new(
            "thermal engine specific consumption",
            engine.rpm.clone(),
            engine.csp_g_per_kwh.clone(),
        )?
        .scaled(engine.csp_scale);

        let electric_torque = LookupTable::new(
            "electric motor torque",
            set.electric_motor.rpm.clone(),
            set.electric_motor.torque_nm.clone(),
        )?;
        let cvt_ratio = LookupTable::new("cvt ratio", set.cvt.engine_rpm.clone(), set.cvt.ratio.clone())?;
        if let Some(index) = cvt_ratio.y().iter().position(|r| *r <= 0.0) {
            return Err(TableError::NonPositive {
                table: "cvt ratio",
                index,
            });
        }

        let track = build_track(&set.track)?;
        let drag_coefficient =
            LookupTable::new("drag coefficient", set.drag.angle_deg.clone(), set.drag.cx.clone())?;

        Ok(Self {
            thermal_torque,
            thermal_csp,
            electric_torque,
            cvt_ratio,
            track,
            drag_coefficient,
        })
    }

    /// Highest sampled engine speed (rpm) of the consumption map.
    pub fn thermal_rpm_max(&self) -> f64 {
        self.thermal_csp.domain().1
    }
}

impl TryFrom<&TableSet> for TableBundle {
    type Error = TableError;

    fn try_from(set: &TableSet) -> TableResult<Self> {
        Self::from_set(set)
    }
}

fn build_track(data: &TrackData) -> TableResult<TrackProfile> {
    match (&data.heading_rad, &data.easting_m, &data.northing_m) {
        (Some(heading), _, _) => TrackProfile::new(
            data.distance_m.clone(),
            data.elevation_m.clone(),
            heading.clone(),
        ),
        (None, Some(east), Some(north)) => TrackProfile::from_planar(
            data.distance_m.clone(),
            data.elevation_m.clone(),
            east,
            north,
        ),
        _ => Err(TableError::InvalidTrack {
            what: "track needs heading_rad or easting_m/northing_m",
        }),
    }
}
