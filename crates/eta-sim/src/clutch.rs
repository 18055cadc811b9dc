//! Centrifugal clutch.
//!
//! Each shoe of mass `m` at radius `r` presses outward with
//! `F = m * ω² * r`. Below the spring preload the clutch is open; above it
//! the drum can carry
//!
//! ```text
//! C_max = N * (F - F_spring) * μ * R_drum
//! ```

use eta_core::numeric::{ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};

use crate::error::SimResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClutchParameters {
    pub shoe_mass_kg: f64,
    pub shoe_radius_m: f64,
    pub shoe_count: f64,
    pub spring_preload_n: f64,
    pub friction_coefficient: f64,
    pub drum_radius_m: f64,
}

impl Default for ClutchParameters {
    fn default() -> Self {
        Self {
            shoe_mass_kg: 0.0774,
            shoe_radius_m: 0.0316,
            shoe_count: 4.0,
            spring_preload_n: 28.23,
            friction_coefficient: 0.3,
            drum_radius_m: 0.045,
        }
    }
}

/// Clutch capacity at a given engine speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClutchEngagement {
    pub engaged: bool,
    /// Maximum transmissible torque (N·m), zero when open.
    pub max_torque: f64,
}

impl ClutchParameters {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.shoe_mass_kg, "shoe_mass_kg")?;
        ensure_positive(self.shoe_radius_m, "shoe_radius_m")?;
        ensure_positive(self.shoe_count, "shoe_count")?;
        ensure_finite(self.spring_preload_n, "spring_preload_n")?;
        ensure_finite(self.friction_coefficient, "friction_coefficient")?;
        ensure_positive(self.drum_radius_m, "drum_radius_m")?;
        Ok(())
    }

    /// Outward force of a single shoe at engine speed `omega` (rad/s).
    #[inline]
    pub fn centrifugal_force(&self, omega: f64) -> f64 {
        self.shoe_mass_kg * omega * omega * self.shoe_radius_m
    }

    #[inline]
    pub fn engagement(&self, omega: f64) -> ClutchEngagement {
        let force = self.centrifugal_force(omega);
        if force > self.spring_preload_n {
            ClutchEngagement {
                engaged: true,
                max_torque: self.shoe_count
                    * (force - self.spring_preload_n)
                    * self.friction_coefficient
                    * self.drum_radius_m,
            }
        } else {
            ClutchEngagement {
                engaged: false,
                max_torque: 0.0,
            }
        }
    }

    /// Engine speed (rad/s) at which the shoes overcome the springs.
    pub fn engagement_speed(&self) -> f64 {
        (self.spring_preload_n / (self.shoe_mass_kg * self.shoe_radius_m)).sqrt()
    }
}
