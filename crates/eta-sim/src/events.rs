//! Terminal event detection.

/// Scalar event function; the event fires when it crosses zero upward.
pub trait EventFunction<S> {
    fn eval(&self, t: f64, x: &S) -> f64;
}

impl<S, F> EventFunction<S> for F
where
    F: Fn(f64, &S) -> f64,
{
    fn eval(&self, t: f64, x: &S) -> f64 {
        self(t, x)
    }
}

/// True when `g` moved from negative to non-negative over a step.
#[inline]
pub(crate) fn rising_crossing(g_prev: f64, g_new: f64) -> bool {
    g_prev < 0.0 && g_new >= 0.0
}

/// Locate the crossing of `g` on `[t_a, t_b]` with the Illinois variant of
/// regula falsi. Requires `g_a < 0 <= g_b`; returns the earliest time found
/// with `g >= 0` to within `tol`.
pub(crate) fn find_crossing(
    g: impl Fn(f64) -> f64,
    (mut t_a, mut g_a): (f64, f64),
    (mut t_b, mut g_b): (f64, f64),
    tol: f64,
    max_iter: usize,
) -> f64 {
    if g_b == 0.0 {
        return t_b;
    }
    // Side retained on the previous iteration: -1 left, +1 right.
    let mut side = 0i8;
    for _ in 0..max_iter {
        if (t_b - t_a).abs() <= tol {
            break;
        }
        let mut t_c = (t_a * g_b - t_b * g_a) / (g_b - g_a);
        if !t_c.is_finite() || t_c <= t_a || t_c >= t_b {
            t_c = 0.5 * (t_a + t_b);
        }
        let g_c = g(t_c);
        if g_c >= 0.0 {
            t_b = t_c;
            g_b = g_c;
            if side == 1 {
                g_a *= 0.5;
            }
            side = 1;
        } else {
            t_a = t_c;
            g_a = g_c;
            if side == -1 {
                g_b *= 0.5;
            }
            side = -1;
        }
        if g_b == 0.0 {
            break;
        }
    }
    t_b
}
