//! Adaptive simulation runner and result recording.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::events::{EventFunction, find_crossing, rising_crossing};
use crate::integrator::{DormandPrince45, StepController, hermite};
use crate::model::TransientModel;

/// Options for the adaptive integrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub rtol: f64,
    pub atol: f64,
    /// Step ceiling (s); keeps mode switches resolved.
    pub max_step: f64,
    /// Step floor (s); a rejection below it aborts the run.
    pub min_step: f64,
    /// First trial step (s); defaults to `max_step`.
    pub initial_step: Option<f64>,
    /// Safety limit on step attempts (accepted + rejected).
    pub max_steps: usize,
    /// Event time tolerance (s).
    pub event_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_step: 0.005,
            min_step: 1e-10,
            initial_step: None,
            max_steps: 2_000_000,
            event_tolerance: 1e-9,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> SimResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.rtol) {
            return Err(SimError::InvalidArg {
                what: "rtol must be positive",
            });
        }
        if !positive(self.atol) {
            return Err(SimError::InvalidArg {
                what: "atol must be positive",
            });
        }
        if !positive(self.max_step) {
            return Err(SimError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        if !positive(self.min_step) || self.min_step > self.max_step {
            return Err(SimError::InvalidArg {
                what: "min_step must be positive and not above max_step",
            });
        }
        if self.initial_step.is_some_and(|h0| !positive(h0)) {
            return Err(SimError::InvalidArg {
                what: "initial_step must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if !positive(self.event_tolerance) {
            return Err(SimError::InvalidArg {
                what: "event_tolerance must be positive",
            });
        }
        Ok(())
    }
}

/// Integrator work counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    pub rhs_evals: u64,
    pub accepted_steps: u64,
    pub rejected_steps: u64,
}

/// Why integration stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The event function crossed zero.
    Event,
    /// `t_end` was reached first.
    EndTime,
}

/// Record of an adaptive run: one entry per accepted step, plus the start.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    pub t: Vec<f64>,
    pub x: Vec<S>,
    pub stop: StopReason,
    pub stats: SolverStats,
}

/// Integrate `model` from `t = 0` until `event` crosses zero upward or
/// `t_end` is reached.
///
/// A crossing inside an accepted step is located on the step's cubic Hermite
/// interpolant and the record ends exactly at the crossing.
pub fn run_sim<M, E>(
    model: &mut M,
    t_end: f64,
    event: &E,
    opts: &SolverOptions,
) -> SimResult<SimRecord<M::State>>
where
    M: TransientModel,
    E: EventFunction<M::State>,
{
    opts.validate()?;
    if !t_end.is_finite() || t_end < 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_end must be finite and non-negative",
        });
    }

    let dp = DormandPrince45::new(opts.rtol, opts.atol);
    let controller = StepController::default();
    let mut stats = SolverStats::default();

    let mut t = 0.0;
    let mut x = model.initial_state();
    let mut f = model.rhs(t, &x)?;
    stats.rhs_evals += 1;

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    let mut g_prev = event.eval(t, &x);
    if g_prev >= 0.0 {
        return Ok(SimRecord {
            t: t_record,
            x: x_record,
            stop: StopReason::Event,
            stats,
        });
    }

    let mut h = opts.initial_step.unwrap_or(opts.max_step).min(opts.max_step);
    let mut attempts = 0usize;
    let mut rejected_here = false;

    while t < t_end {
        attempts += 1;
        if attempts > opts.max_steps {
            return Err(SimError::MaxStepsExceeded {
                max_steps: opts.max_steps,
                t,
            });
        }

        let reaches_end = t + h >= t_end;
        let h_try = if reaches_end { t_end - t } else { h };

        let step = dp.attempt(model, t, &x, &f, h_try)?;
        stats.rhs_evals += 6;
        if !step.error.is_finite() {
            return Err(SimError::NonFinite {
                what: "integration error estimate",
                t,
            });
        }

        if step.error > 1.0 {
            stats.rejected_steps += 1;
            rejected_here = true;
            h = h_try * controller.reject_factor(step.error);
            if h < opts.min_step {
                return Err(SimError::StepSizeTooSmall { t, h });
            }
            continue;
        }

        stats.accepted_steps += 1;
        let t_new = if reaches_end { t_end } else { t + h_try };
        if model.components(&step.x).iter().any(|v| !v.is_finite()) {
            return Err(SimError::NonFinite {
                what: "state",
                t: t_new,
            });
        }

        let g_new = event.eval(t_new, &step.x);
        if rising_crossing(g_prev, g_new) {
            let start = (t, &x, &f);
            let end = (t_new, &step.x, &step.dxdt);
            let g_at = |tc: f64| event.eval(tc, &hermite(&*model, start, end, tc));
            let t_event = find_crossing(
                g_at,
                (t, g_prev),
                (t_new, g_new),
                opts.event_tolerance,
                100,
            );
            let x_event = hermite(&*model, start, end, t_event);
            t_record.push(t_event);
            x_record.push(x_event);
            return Ok(SimRecord {
                t: t_record,
                x: x_record,
                stop: StopReason::Event,
                stats,
            });
        }

        t = t_new;
        x = step.x;
        f = step.dxdt;
        g_prev = g_new;
        t_record.push(t);
        x_record.push(x.clone());

        h = (h_try * controller.accept_factor(step.error, rejected_here)).min(opts.max_step);
        rejected_here = false;
        if reaches_end {
            break;
        }
    }

    Ok(SimRecord {
        t: t_record,
        x: x_record,
        stop: StopReason::EndTime,
        stats,
    })
}
