use crate::traits::{Scalar, Steppable, VectorField};

/// Classic Runge-Kutta 4th order solver.
///
/// Stage buffers are allocated once at construction and reused for every
/// step, so the per-step cost is exactly four field evaluations.
pub struct Rk4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    stage: Vec<T>,
}

impl<T: Scalar> Rk4<T> {
    pub fn new(dim: usize) -> Self {
        let zero = T::zero();
        Self {
            k1: vec![zero; dim],
            k2: vec![zero; dim],
            k3: vec![zero; dim],
            k4: vec![zero; dim],
            stage: vec![zero; dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Rk4<T> {
    fn step(&mut self, field: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T) {
        let half = T::from_f64(0.5).unwrap();
        let sixth = T::from_f64(1.0 / 6.0).unwrap();
        let two = T::from_f64(2.0).unwrap();

        let t0 = *t;

        // k1 = f(t, y)
        field.apply(t0, state, &mut self.k1);

        // k2 = f(t + dt/2, y + dt*k1/2)
        for i in 0..state.len() {
            self.stage[i] = state[i] + dt * half * self.k1[i];
        }
        field.apply(t0 + dt * half, &self.stage, &mut self.k2);

        // k3 = f(t + dt/2, y + dt*k2/2)
        for i in 0..state.len() {
            self.stage[i] = state[i] + dt * half * self.k2[i];
        }
        field.apply(t0 + dt * half, &self.stage, &mut self.k3);

        // k4 = f(t + dt, y + dt*k3)
        for i in 0..state.len() {
            self.stage[i] = state[i] + dt * self.k3[i];
        }
        field.apply(t0 + dt, &self.stage, &mut self.k4);

        // y_next = y + dt/6 * (k1 + 2*k2 + 2*k3 + k4)
        for i in 0..state.len() {
            state[i] = state[i]
                + dt * sixth * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }

        *t = t0 + dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Exponential {
        rate: f64,
    }

    impl VectorField<f64> for Exponential {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = self.rate * x[0];
        }
    }

    fn integrate_exponential(rate: f64, y0: f64, horizon: f64, dt: f64) -> f64 {
        let field = Exponential { rate };
        let mut solver = Rk4::new(1);
        let mut t = 0.0;
        let mut state = [y0];
        let steps = (horizon / dt).round() as usize;
        for _ in 0..steps {
            solver.step(&field, &mut t, &mut state, dt);
        }
        state[0]
    }

    #[test]
    fn rk4_tracks_exponential_growth() {
        let value = integrate_exponential(0.3, 2.0, 2.0, 0.05);
        let exact = 2.0 * (0.3_f64 * 2.0).exp();
        assert!((value - exact).abs() / exact < 1e-8);
    }

    #[test]
    fn rk4_error_shrinks_at_fourth_order_under_step_halving() {
        let exact = 1.0 * (0.5_f64 * 4.0).exp();
        let coarse = (integrate_exponential(0.5, 1.0, 4.0, 0.5) - exact).abs();
        let fine = (integrate_exponential(0.5, 1.0, 4.0, 0.25) - exact).abs();
        let ratio = coarse / fine;
        // 4th order: halving the step shrinks the error by roughly 2^4.
        assert!(
            ratio > 10.0 && ratio < 25.0,
            "expected ~16x error reduction, got {ratio}"
        );
    }

    #[test]
    fn rk4_steps_backward_with_negative_dt() {
        let field = Exponential { rate: 1.0 };
        let mut solver = Rk4::new(1);
        let mut t = 0.0;
        let mut state = [1.0];
        solver.step(&field, &mut t, &mut state, -0.1);
        assert!((t + 0.1).abs() < 1e-15);
        let exact = (-0.1_f64).exp();
        assert!((state[0] - exact).abs() < 1e-6);
    }

    #[test]
    fn rk4_updates_time_by_exactly_dt() {
        let field = Exponential { rate: 0.0 };
        let mut solver = Rk4::new(1);
        let mut t = 3.0;
        let mut state = [1.0];
        solver.step(&field, &mut t, &mut state, 0.125);
        assert_eq!(t, 3.125);
        assert_eq!(state[0], 1.0);
    }
}
