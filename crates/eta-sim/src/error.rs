//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while preparing or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid phase table: {reason}")]
    InvalidPhaseTable { reason: String },

    #[error("Lookup table error: {0}")]
    Table(#[from] eta_tables::TableError),

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-finite value for {what} at t={t}")]
    NonFinite { what: &'static str, t: f64 },

    #[error("Simulation produced no samples (terminated at t={t})")]
    NoSamplesProduced { t: f64 },

    #[error("Step size {h} fell below the minimum at t={t}")]
    StepSizeTooSmall { t: f64, h: f64 },

    #[error("Maximum number of integration steps ({max_steps}) exceeded at t={t}")]
    MaxStepsExceeded { max_steps: usize, t: f64 },

    #[error("Core error: {0}")]
    Core(#[from] eta_core::EtaError),
}

pub type SimResult<T> = Result<T, SimError>;
