//! Piecewise-linear interpolant with linear extrapolation.

use crate::error::{TableError, TableResult};

/// Sorted `(x, y)` samples evaluated by piecewise-linear interpolation.
///
/// Queries outside the sampled domain extrapolate along the first or last
/// segment; nothing is clamped and evaluation never fails. A single-sample
/// table evaluates to that sample everywhere.
///
/// Lookup is a binary search over `x`, so evaluation is `O(log n)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupTable {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LookupTable {
    /// Build a table, rejecting empty, mismatched, non-finite or
    /// non-strictly-increasing samples.
    ///
    /// `name` identifies the table in error messages.
    pub fn new(name: &'static str, x: Vec<f64>, y: Vec<f64>) -> TableResult<Self> {
        if x.is_empty() || y.is_empty() {
            return Err(TableError::Empty { table: name });
        }
        if x.len() != y.len() {
            return Err(TableError::LengthMismatch {
                table: name,
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        for (index, (xi, yi)) in x.iter().zip(&y).enumerate() {
            if !xi.is_finite() || !yi.is_finite() {
                return Err(TableError::NonFinite { table: name, index });
            }
        }
        if let Some(index) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(TableError::NonMonotonic {
                table: name,
                index: index + 1,
            });
        }
        Ok(Self { x, y })
    }

    /// Interpolated value at `q`, extrapolating beyond the sampled domain.
    #[inline]
    pub fn eval(&self, q: f64) -> f64 {
        let n = self.x.len();
        if n == 1 {
            return self.y[0];
        }
        let upper = self.x.partition_point(|&xi| xi <= q).clamp(1, n - 1);
        self.on_segment(upper - 1, q)
    }

    /// Interpolated value at `q`, holding the end samples outside the domain.
    #[inline]
    pub fn eval_clamped(&self, q: f64) -> f64 {
        let last = self.x.len() - 1;
        if q <= self.x[0] {
            self.y[0]
        } else if q >= self.x[last] {
            self.y[last]
        } else {
            self.eval(q)
        }
    }

    #[inline]
    fn on_segment(&self, i: usize, q: f64) -> f64 {
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        y0 + (y1 - y0) * (q - x0) / (x1 - x0)
    }

    /// Same abscissae with every ordinate multiplied by `factor`.
    pub fn scaled(mut self, factor: f64) -> Self {
        for yi in &mut self.y {
            *yi *= factor;
        }
        self
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false: empty tables are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Sampled domain `(x_min, x_max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn sorted_table() -> impl Strategy<Value = LookupTable> {
        prop::collection::vec((0.01_f64..10.0, -100.0_f64..100.0), 2..20).prop_map(|steps| {
            let mut x = Vec::with_capacity(steps.len());
            let mut acc = 0.0;
            for (dx, _) in &steps {
                acc += dx;
                x.push(acc);
            }
            let y = steps.iter().map(|(_, y)| *y).collect();
            LookupTable::new("prop", x, y).unwrap()
        })
    }

    proptest! {
        #[test]
        fn interior_values_stay_between_neighbours(t in sorted_table(), frac in 0.0_f64..1.0) {
            let (lo, hi) = t.domain();
            let q = lo + frac * (hi - lo);
            let i = t.x().partition_point(|&xi| xi <= q).clamp(1, t.len() - 1);
            let (a, b) = (t.y()[i - 1], t.y()[i]);
            let v = t.eval(q);
            prop_assert!(v >= a.min(b) - 1e-9 && v <= a.max(b) + 1e-9);
        }

        #[test]
        fn knots_are_reproduced(t in sorted_table()) {
            for (xi, yi) in t.x().iter().zip(t.y()) {
                prop_assert!((t.eval(*xi) - yi).abs() <= 1e-9 * (1.0 + yi.abs()));
            }
        }
    }
}
