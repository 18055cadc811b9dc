//! Adaptive Dormand-Prince 5(4) integrator.
//!
//! Seven-stage embedded pair with the first-same-as-last property: the
//! derivative at the end of an accepted step is the first stage of the next
//! one, so an accepted step costs six right-hand-side evaluations.

use crate::error::SimResult;
use crate::model::TransientModel;

const C: [f64; 5] = [1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

const A: [&[f64]; 6] = [
    &[1.0 / 5.0],
    &[3.0 / 40.0, 9.0 / 40.0],
    &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
    &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
    &[
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
    &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];

/// Difference between the fifth- and fourth-order weights.
const E: [f64; 7] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

/// Error order used by the step-size controller.
const ERROR_EXPONENT: f64 = 1.0 / 5.0;

/// Step-size controller.
///
/// `h_new = safety · h · err^(-1/5)`, bounded by the growth limits.
#[derive(Clone, Debug)]
pub struct StepController {
    pub safety: f64,
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 10.0,
        }
    }
}

impl StepController {
    /// Growth factor after an accepted step.
    pub fn accept_factor(&self, error: f64, after_rejection: bool) -> f64 {
        let factor = if error == 0.0 {
            self.max_factor
        } else {
            (self.safety * error.powf(-ERROR_EXPONENT)).min(self.max_factor)
        };
        if after_rejection { factor.min(1.0) } else { factor }
    }

    /// Shrink factor after a rejected step.
    pub fn reject_factor(&self, error: f64) -> f64 {
        (self.safety * error.powf(-ERROR_EXPONENT)).max(self.min_factor)
    }
}

/// Outcome of one trial step.
#[derive(Clone, Debug)]
pub struct StepAttempt<S> {
    /// Fifth-order solution at `t + h`.
    pub x: S,
    /// Derivative at `(t + h, x)`.
    pub dxdt: S,
    /// Scaled RMS error estimate; the step is acceptable when `<= 1`.
    pub error: f64,
}

#[derive(Clone, Debug)]
pub struct DormandPrince45 {
    pub rtol: f64,
    pub atol: f64,
}

impl DormandPrince45 {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Attempt a step of size `h` from `(t, x)` with known derivative `f0`.
    pub fn attempt<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        f0: &M::State,
        h: f64,
    ) -> SimResult<StepAttempt<M::State>> {
        let mut k: Vec<M::State> = Vec::with_capacity(7);
        k.push(f0.clone());
        for (stage, row) in A[..5].iter().enumerate() {
            let x_stage = combine(model, x, h, row, &k);
            k.push(model.rhs(t + C[stage] * h, &x_stage)?);
        }
        let x_new = combine(model, x, h, A[5], &k);
        let dxdt = model.rhs(t + h, &x_new)?;
        k.push(dxdt.clone());

        let err_state = combine_increment(model, h, &E, &k);
        let error = self.error_norm(
            model.components(&err_state),
            model.components(x),
            model.components(&x_new),
        );

        Ok(StepAttempt {
            x: x_new,
            dxdt,
            error,
        })
    }

    fn error_norm(&self, err: &[f64], x0: &[f64], x1: &[f64]) -> f64 {
        let n = err.len().max(1) as f64;
        let sum: f64 = err
            .iter()
            .zip(x0.iter().zip(x1))
            .map(|(e, (a, b))| {
                let scale = self.atol + self.rtol * a.abs().max(b.abs());
                (e / scale).powi(2)
            })
            .sum();
        (sum / n).sqrt()
    }
}

/// `x + h · Σ coeffs[i] · k[i]`.
fn combine<M: TransientModel>(
    model: &M,
    x: &M::State,
    h: f64,
    coeffs: &[f64],
    k: &[M::State],
) -> M::State {
    let increment = combine_increment(model, h, coeffs, k);
    model.add(x, &increment)
}

/// `h · Σ coeffs[i] · k[i]`.
fn combine_increment<M: TransientModel>(
    model: &M,
    h: f64,
    coeffs: &[f64],
    k: &[M::State],
) -> M::State {
    let mut acc = model.scale(&k[0], h * coeffs[0]);
    for (c, ki) in coeffs.iter().zip(k).skip(1) {
        if *c != 0.0 {
            acc = model.add(&acc, &model.scale(ki, h * c));
        }
    }
    acc
}

/// Cubic Hermite interpolation over an accepted step.
///
/// Uses the endpoint values and derivatives, both already available after
/// a Dormand-Prince step, so locating an event inside the step costs no
/// further right-hand-side evaluations.
pub fn hermite<M: TransientModel>(
    model: &M,
    (t0, x0, f0): (f64, &M::State, &M::State),
    (t1, x1, f1): (f64, &M::State, &M::State),
    t: f64,
) -> M::State {
    let dt = t1 - t0;
    let a = (t - t0) / dt;
    let a2 = a * a;
    let a3 = a2 * a;
    let h00 = 1.0 - 3.0 * a2 + 2.0 * a3;
    let h10 = a - 2.0 * a2 + a3;
    let h01 = 3.0 * a2 - 2.0 * a3;
    let h11 = a3 - a2;

    let y0 = model.add(&model.scale(x0, h00), &model.scale(f0, h10 * dt));
    let y1 = model.add(&model.scale(x1, h01), &model.scale(f1, h11 * dt));
    model.add(&y0, &y1)
}
