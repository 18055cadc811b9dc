//! Speed-bound driving phases.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Highest phase speed bound accepted (m/s).
pub const MAX_PHASE_SPEED: f64 = 15.0;

/// Speed interval during which the thermal engine is expected to drive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseBounds {
    pub speed_min: f64,
    pub speed_max: f64,
}

impl PhaseBounds {
    pub fn new(speed_min: f64, speed_max: f64) -> Self {
        Self {
            speed_min,
            speed_max,
        }
    }
}

impl From<(f64, f64)> for PhaseBounds {
    fn from((speed_min, speed_max): (f64, f64)) -> Self {
        Self::new(speed_min, speed_max)
    }
}

/// Validated, ordered phase bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable {
    bounds: Vec<PhaseBounds>,
}

impl PhaseTable {
    /// Validate and build a phase table.
    ///
    /// Rejects an empty table, non-finite bounds, `speed_min >= speed_max`,
    /// and bounds outside `[0, MAX_PHASE_SPEED]`.
    pub fn new(bounds: Vec<PhaseBounds>) -> SimResult<Self> {
        if bounds.is_empty() {
            return Err(SimError::InvalidPhaseTable {
                reason: "at least one phase is required".to_string(),
            });
        }
        for (i, b) in bounds.iter().enumerate() {
            let phase = i + 1;
            if !b.speed_min.is_finite() || !b.speed_max.is_finite() {
                return Err(SimError::InvalidPhaseTable {
                    reason: format!("phase {phase}: bounds must be finite"),
                });
            }
            if b.speed_min >= b.speed_max {
                return Err(SimError::InvalidPhaseTable {
                    reason: format!(
                        "phase {phase}: speed_min ({}) >= speed_max ({})",
                        b.speed_min, b.speed_max
                    ),
                });
            }
            if b.speed_min < 0.0 {
                return Err(SimError::InvalidPhaseTable {
                    reason: format!("phase {phase}: negative speed {}", b.speed_min),
                });
            }
            if b.speed_max > MAX_PHASE_SPEED {
                return Err(SimError::InvalidPhaseTable {
                    reason: format!(
                        "phase {phase}: speed_max ({}) above {MAX_PHASE_SPEED} m/s",
                        b.speed_max
                    ),
                });
            }
        }
        Ok(Self { bounds })
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Always false: empty tables are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhaseBounds> {
        self.bounds.get(index)
    }

    pub fn bounds(&self) -> &[PhaseBounds] {
        &self.bounds
    }
}

/// Per-phase progress carried by the controller.
///
/// `completed` flags only ever go from false to true and `current` never
/// decreases.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhaseProgress {
    pub current: usize,
    pub started: Vec<bool>,
    pub completed: Vec<bool>,
}

impl PhaseProgress {
    pub fn new(phase_count: usize) -> Self {
        Self {
            current: 0,
            started: vec![false; phase_count],
            completed: vec![false; phase_count],
        }
    }

    pub fn completed_count(&self) -> usize {
        self.completed.iter().filter(|c| **c).count()
    }
}
