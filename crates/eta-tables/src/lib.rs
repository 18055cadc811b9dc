//! eta-tables: piecewise-linear lookup tables for the vehicle simulation.
//!
//! Five datasets feed every force and control computation:
//! - thermal engine torque and specific consumption vs. engine speed
//! - electric motor torque vs. motor speed
//! - CVT ratio vs. engine speed
//! - track elevation and heading vs. distance
//! - aerodynamic drag coefficient vs. relative wind angle
//!
//! Tables are validated once at construction and are immutable afterwards, so
//! a [`TableBundle`] can be shared by reference across concurrent runs.

pub mod bundle;
pub mod error;
pub mod lookup;
pub mod track;

pub use bundle::{
    CvtData, DragData, ElectricMotorData, TableBundle, TableSet, ThermalEngineData, TrackData,
};
pub use error::{TableError, TableResult};
pub use lookup::LookupTable;
pub use track::TrackProfile;
