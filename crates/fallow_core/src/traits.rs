use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types usable as scalars in the simulation engine.
/// Must support floating-point arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A continuous-time vector field dy/dt = f(t, y).
pub trait VectorField<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field.
    /// t: current time
    /// x: current state
    /// out: buffer to write dy/dt into
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// A trait for fixed-step solvers that advance a vector field in time.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size dt.
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    /// dt: step size; may be negative for backward integration
    fn step(&mut self, field: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T);
}
