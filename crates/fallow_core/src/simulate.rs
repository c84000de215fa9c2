use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{validate_grid, GridSpec};
use crate::model::{Diagnostics, LandUseModel, Parameters, State, STATE_DIM};
use crate::solvers::Rk4;
use crate::traits::Steppable;

/// Ways a run can be rejected before it starts or, in strict mode, fail
/// at the first numeric degeneracy.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SimulationError {
    #[error("time grid must contain at least one point")]
    EmptyGrid,
    #[error("time grid must be strictly monotonic; violated at index {index}")]
    NonMonotonicGrid { index: usize },
    #[error("grid step {step} cannot reach the requested endpoint")]
    InvalidStep { step: f64 },
    #[error("parameter {name} must be positive, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("non-finite state or diagnostics at t = {time}")]
    NonFinite { time: f64 },
}

/// Run-level switches. The defaults reproduce the reference model exactly,
/// including NaN/Inf propagation and negative states.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulateOptions {
    /// Fail with [`SimulationError::NonFinite`] as soon as a grid point's
    /// state or diagnostics contain NaN/Inf, instead of letting the
    /// degeneracy propagate through the rest of the trajectory.
    pub strict: bool,
    /// Clamp all four state quantities to `>= 0` after each accepted step.
    /// The reference model does not clamp; this is an explicit opt-in.
    pub clamp_to_physical_domain: bool,
}

/// One trajectory record: state at a grid point plus the diagnostics
/// recomputed at that exact point.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Sample {
    pub time: f64,
    pub state: State,
    pub diagnostics: Diagnostics,
}

pub const COLUMN_COUNT: usize = 12;

/// Column names matching [`Sample::row`], the fixed tabular export order.
pub const COLUMNS: [&str; COLUMN_COUNT] = [
    "time",
    "forest",
    "agricultural_land",
    "fertility",
    "population",
    "deforestation",
    "fertility_losses",
    "food_produced",
    "demand_for_food",
    "gap",
    "emigration",
    "population_natural_increase",
];

impl Sample {
    /// Flat row in the fixed reporting order of [`COLUMNS`].
    pub fn row(&self) -> [f64; COLUMN_COUNT] {
        [
            self.time,
            self.state.forest,
            self.state.agricultural_land,
            self.state.fertility,
            self.state.population,
            self.diagnostics.deforestation,
            self.diagnostics.fertility_losses,
            self.diagnostics.food_produced,
            self.diagnostics.demand_for_food,
            self.diagnostics.gap,
            self.diagnostics.emigration,
            self.diagnostics.population_natural_increase,
        ]
    }

    fn is_finite(&self) -> bool {
        self.row().iter().all(|value| value.is_finite())
    }
}

/// The full time-ordered output of one integration run. Immutable after
/// construction and owned by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }

    pub fn last(&self) -> &Sample {
        &self.samples[self.samples.len() - 1]
    }

    /// Row-oriented dump for tabular consumers, one row per grid point.
    pub fn rows(&self) -> Vec<[f64; COLUMN_COUNT]> {
        self.samples.iter().map(Sample::row).collect()
    }
}

/// Integrates the land-use model across `grid` with classical RK4, one
/// step per consecutive pair of grid points.
///
/// The first sample is the initial condition itself; every sample carries
/// diagnostics recomputed at its own grid point. Configuration problems
/// are rejected before the first model evaluation, so a run either
/// returns a complete trajectory or no trajectory at all.
///
/// Runs are independent of each other and share no state, so parameter
/// sweeps parallelize at the whole-run level; within one run the steps
/// are strictly sequential.
pub fn simulate(
    parameters: Parameters,
    initial_state: State,
    grid: &[f64],
    options: SimulateOptions,
) -> Result<Trajectory> {
    parameters.check()?;
    validate_grid(grid)?;

    let model = LandUseModel::new(parameters);
    let mut solver = Rk4::new(STATE_DIM);
    let mut state = initial_state.to_array();
    let mut t = grid[0];

    let mut samples = Vec::with_capacity(grid.len());
    let first = Sample {
        time: grid[0],
        state: initial_state,
        diagnostics: model.diagnostics(grid[0], &initial_state),
    };
    if options.strict && !first.is_finite() {
        return Err(SimulationError::NonFinite { time: grid[0] }.into());
    }
    samples.push(first);

    for index in 1..grid.len() {
        let target = grid[index];
        let dt = target - grid[index - 1];
        solver.step(&model, &mut t, &mut state, dt);
        // Report the requested grid point, not the accumulated sum of steps.
        t = target;

        if options.clamp_to_physical_domain {
            for value in &mut state {
                if *value < 0.0 {
                    *value = 0.0;
                }
            }
        }

        let recorded = State::from_slice(&state);
        let sample = Sample {
            time: target,
            state: recorded,
            diagnostics: model.diagnostics(target, &recorded),
        };
        if options.strict && !sample.is_finite() {
            return Err(SimulationError::NonFinite { time: target }.into());
        }
        samples.push(sample);
    }

    Ok(Trajectory { samples })
}

/// Complete configuration for one run, in the shape external callers
/// supply: parameters, initial state, and a uniform grid description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub parameters: Parameters,
    pub initial_state: State,
    pub grid: GridSpec,
}

impl Scenario {
    pub fn run(&self, options: SimulateOptions) -> Result<Trajectory> {
        let grid = self.grid.expand()?;
        simulate(self.parameters, self.initial_state, &grid, options)
    }
}
