use serde::{Deserialize, Serialize};

use crate::simulate::SimulationError;

/// An inclusive `{from, to, step}` description of a uniform time grid,
/// the shape configuration files supply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub from: f64,
    pub to: f64,
    pub step: f64,
}

impl GridSpec {
    /// Expands the description into explicit grid points.
    ///
    /// Points are generated as `from + i * step` rather than by repeated
    /// addition, so long grids do not accumulate rounding drift. The last
    /// point is the furthest `from + i * step` that does not pass `to`.
    pub fn expand(&self) -> Result<Vec<f64>, SimulationError> {
        if !self.from.is_finite() || !self.to.is_finite() {
            return Err(SimulationError::InvalidStep { step: self.step });
        }
        if !self.step.is_finite() || self.step == 0.0 {
            return Err(SimulationError::InvalidStep { step: self.step });
        }
        let span = (self.to - self.from) / self.step;
        if span < 0.0 {
            // Step points away from the endpoint.
            return Err(SimulationError::InvalidStep { step: self.step });
        }
        // Tolerate endpoints that miss by rounding noise.
        let count = (span + 1e-9).floor() as usize + 1;
        Ok((0..count)
            .map(|i| self.from + i as f64 * self.step)
            .collect())
    }
}

/// Checks that a grid has at least one point and is strictly monotonic
/// in one consistent direction (increasing or decreasing).
pub fn validate_grid(grid: &[f64]) -> Result<(), SimulationError> {
    if grid.is_empty() {
        return Err(SimulationError::EmptyGrid);
    }
    if !grid[0].is_finite() {
        return Err(SimulationError::NonMonotonicGrid { index: 0 });
    }
    if grid.len() == 1 {
        return Ok(());
    }
    let direction = (grid[1] - grid[0]).signum();
    for index in 1..grid.len() {
        let dt = grid[index] - grid[index - 1];
        if !dt.is_finite() || dt == 0.0 || dt.signum() != direction {
            return Err(SimulationError::NonMonotonicGrid { index });
        }
    }
    Ok(())
}
