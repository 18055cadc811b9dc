//! TransientModel trait for the integrated dynamical system.

use crate::error::SimResult;

/// A dynamical system `x' = f(t, x)` the adaptive integrator can advance.
///
/// `rhs` takes `&mut self` so a model can carry evaluation-side state
/// (controller context, diagnostic trace) across calls. The integrator
/// guarantees nothing about the order of the times it evaluates: rejected
/// steps revisit earlier instants.
pub trait TransientModel {
    type State: Clone;

    fn initial_state(&self) -> Self::State;

    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// Element-wise `a + b`.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Element-wise `scale * a`.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    /// Flat view of the state used for error control and finiteness checks.
    fn components<'s>(&self, x: &'s Self::State) -> &'s [f64];
}
