//! Re-interpolation of the diagnostic trace onto the output time grid.

use eta_tables::LookupTable;

use crate::error::SimResult;
use crate::trace::{Channel, DiagnosticTrace};

/// Linearly interpolate `(times, values)` onto `grid`, extrapolating past
/// the sampled range. `times` must be strictly increasing. An empty series
/// yields zeros.
pub fn resample(times: &[f64], values: &[f64], grid: &[f64]) -> SimResult<Vec<f64>> {
    if times.is_empty() {
        return Ok(vec![0.0; grid.len()]);
    }
    let table = LookupTable::new("diagnostic channel", times.to_vec(), values.to_vec())?;
    Ok(grid.iter().map(|&t| table.eval(t)).collect())
}

/// Every [`Channel`] of a trace evaluated on one grid.
#[derive(Debug, Clone)]
pub struct ResampledTrace {
    channels: Vec<Vec<f64>>,
}

impl ResampledTrace {
    pub fn channel(&self, channel: Channel) -> &[f64] {
        &self.channels[channel as usize]
    }

    /// Take ownership of one channel's series.
    pub fn take(&mut self, channel: Channel) -> Vec<f64> {
        std::mem::take(&mut self.channels[channel as usize])
    }
}

pub fn resample_trace(trace: &DiagnosticTrace, grid: &[f64]) -> SimResult<ResampledTrace> {
    let ordered = trace.time_ordered();
    let times: Vec<f64> = ordered.iter().map(|s| s.time).collect();
    let channels = Channel::ALL
        .iter()
        .map(|ch| {
            let values: Vec<f64> = ordered.iter().map(|s| ch.value(s)).collect();
            resample(&times, &values, grid)
        })
        .collect::<SimResult<Vec<_>>>()?;
    Ok(ResampledTrace { channels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::DiagnosticSample;

    #[test]
    fn interpolates_and_extrapolates() {
        let out = resample(&[0.0, 1.0, 2.0], &[0.0, 10.0, 0.0], &[0.5, 1.5, 3.0]).unwrap();
        assert_eq!(out, vec![5.0, 5.0, -10.0]);
    }

    #[test]
    fn empty_series_is_zero_filled() {
        let out = resample(&[], &[], &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(out, vec![0.0; 3]);
    }

    #[test]
    fn single_sample_is_constant() {
        let out = resample(&[1.0], &[7.0], &[0.0, 5.0]).unwrap();
        assert_eq!(out, vec![7.0, 7.0]);
    }

    #[test]
    fn empty_trace_yields_every_channel() {
        let grid = [0.0, 0.1];
        let r = resample_trace(&DiagnosticTrace::new(), &grid).unwrap();
        for ch in Channel::ALL {
            assert_eq!(r.channel(ch), &[0.0, 0.0]);
        }
    }

    #[test]
    fn unordered_trace_is_sorted_first() {
        let mut trace = DiagnosticTrace::new();
        for (t, e) in [(0.0, 0.0), (1.0, 100.0), (0.5, 50.0), (1.0, 90.0)] {
            trace.push(DiagnosticSample {
                time: t,
                stored_energy: e,
                ..DiagnosticSample::default()
            });
        }
        let r = resample_trace(&trace, &[0.25, 1.0]).unwrap();
        assert_eq!(r.channel(Channel::StoredEnergy), &[25.0, 90.0]);
    }
}
