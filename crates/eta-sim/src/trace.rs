//! Diagnostic trace recorded at every right-hand-side evaluation.

use crate::controller::{ControllerContext, MotorMode};
use crate::forces::ForceBreakdown;

/// One evaluation-time snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DiagnosticSample {
    pub time: f64,
    pub forces: ForceBreakdown,
    pub engine_rpm: f64,
    pub electric_rpm: f64,
    pub cvt_ratio: f64,
    pub stored_energy: f64,
    pub electrical_energy: f64,
    pub mode: MotorMode,
    pub freewheel: bool,
}

impl DiagnosticSample {
    /// Sample for an evaluation past the finish line: no forces, energies held.
    pub fn finished(time: f64, ctx: &ControllerContext) -> Self {
        Self {
            time,
            stored_energy: ctx.stored_energy,
            electrical_energy: ctx.electrical_energy_consumed,
            mode: ctx.mode,
            ..Self::default()
        }
    }
}

/// Named numeric channels of a [`DiagnosticSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    MotorForce,
    ElectricForce,
    AeroForce,
    RollingForce,
    GravityForce,
    WindForce,
    BrakingForce,
    EngineRpm,
    ElectricRpm,
    CvtRatio,
    StoredEnergy,
    ElectricalEnergy,
    ThermalActive,
    ElectricActive,
    Freewheel,
}

impl Channel {
    pub const ALL: [Channel; 15] = [
        Channel::MotorForce,
        Channel::ElectricForce,
        Channel::AeroForce,
        Channel::RollingForce,
        Channel::GravityForce,
        Channel::WindForce,
        Channel::BrakingForce,
        Channel::EngineRpm,
        Channel::ElectricRpm,
        Channel::CvtRatio,
        Channel::StoredEnergy,
        Channel::ElectricalEnergy,
        Channel::ThermalActive,
        Channel::ElectricActive,
        Channel::Freewheel,
    ];

    pub fn value(self, s: &DiagnosticSample) -> f64 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            Channel::MotorForce => s.forces.motor,
            Channel::ElectricForce => s.forces.electric,
            Channel::AeroForce => s.forces.aero,
            Channel::RollingForce => s.forces.rolling,
            Channel::GravityForce => s.forces.gravity,
            Channel::WindForce => s.forces.wind,
            Channel::BrakingForce => s.forces.braking,
            Channel::EngineRpm => s.engine_rpm,
            Channel::ElectricRpm => s.electric_rpm,
            Channel::CvtRatio => s.cvt_ratio,
            Channel::StoredEnergy => s.stored_energy,
            Channel::ElectricalEnergy => s.electrical_energy,
            Channel::ThermalActive => flag(s.mode.is_thermal()),
            Channel::ElectricActive => flag(s.mode.is_electric()),
            Channel::Freewheel => flag(s.freewheel),
        }
    }
}

/// Evaluation-ordered samples. Times are not monotonic: rejected steps
/// revisit earlier instants.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticTrace {
    samples: Vec<DiagnosticSample>,
}

impl DiagnosticTrace {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, sample: DiagnosticSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[DiagnosticSample] {
        &self.samples
    }

    /// Samples sorted by time, keeping the latest evaluation at each
    /// repeated instant.
    pub fn time_ordered(&self) -> Vec<DiagnosticSample> {
        let mut sorted = self.samples.clone();
        sorted.sort_by(|a, b| a.time.total_cmp(&b.time));
        let mut out: Vec<DiagnosticSample> = Vec::with_capacity(sorted.len());
        for s in sorted {
            match out.last_mut() {
                Some(last) if last.time == s.time => *last = s,
                _ => out.push(s),
            }
        }
        out
    }
}
