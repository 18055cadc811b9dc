//! eta-core: shared foundation for the Eta-One simulation workspace.
//!
//! Contains:
//! - numeric (Real + finiteness and range checks)
//! - units (uom-backed conversions used when reporting results)
//! - error (shared error type)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{EtaError, EtaResult};
pub use numeric::*;
