use serde::{Deserialize, Serialize};

use crate::simulate::SimulationError;
use crate::traits::{Scalar, VectorField};

/// Index of each state quantity in the packed state vector.
pub const FOREST: usize = 0;
pub const AGRICULTURAL_LAND: usize = 1;
pub const FERTILITY: usize = 2;
pub const POPULATION: usize = 3;

pub const STATE_DIM: usize = 4;

/// The four time-varying quantities evolved by integration.
///
/// The integrator enforces no sign constraints: quantities can go negative
/// or blow up, and the trajectory reports whatever the equations produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Forested area.
    pub forest: f64,
    /// Cropland area.
    pub agricultural_land: f64,
    /// Yield per unit of cropland.
    pub fertility: f64,
    /// Person count.
    pub population: f64,
}

impl State {
    pub fn to_array(self) -> [f64; STATE_DIM] {
        [
            self.forest,
            self.agricultural_land,
            self.fertility,
            self.population,
        ]
    }

    pub fn from_slice(x: &[f64]) -> Self {
        Self {
            forest: x[FOREST],
            agricultural_land: x[AGRICULTURAL_LAND],
            fertility: x[FERTILITY],
            population: x[POPULATION],
        }
    }
}

/// Fixed coefficients governing the flow equations for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Damping factor dividing both land-use flows. Must be positive.
    pub intensity: f64,
    /// Fraction of per-capita food shortage converted to emigration.
    pub emigration_ratio: f64,
    /// Food demand per person per unit time. Must be positive.
    pub consumed_food_per_person: f64,
    /// Intrinsic fractional population growth rate per unit time.
    pub natural_increase_rate: f64,
}

impl Parameters {
    /// Rejects values that would make the flow equations divide by zero.
    pub fn check(&self) -> Result<(), SimulationError> {
        if !(self.intensity > 0.0) {
            return Err(SimulationError::InvalidParameter {
                name: "intensity",
                value: self.intensity,
            });
        }
        if !(self.consumed_food_per_person > 0.0) {
            return Err(SimulationError::InvalidParameter {
                name: "consumed_food_per_person",
                value: self.consumed_food_per_person,
            });
        }
        Ok(())
    }
}

/// The flow and diagnostic quantities computed from one state evaluation.
/// Recomputed fresh at every evaluation; never fed back as inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Flows<T> {
    pub deforestation: T,
    pub fertility_losses: T,
    pub food_produced: T,
    pub demand_for_food: T,
    pub gap: T,
    pub emigration: T,
    pub population_natural_increase: T,
}

/// Diagnostics reported alongside each trajectory point.
pub type Diagnostics = Flows<f64>;

/// The coupled forest / cropland / fertility / population system.
///
/// Evaluation is pure: the derivatives depend only on the supplied state
/// and the parameters captured at construction. Time appears in the
/// signature for generality but the equations are autonomous.
#[derive(Debug, Clone, Copy)]
pub struct LandUseModel {
    params: Parameters,
}

impl LandUseModel {
    pub fn new(params: Parameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Evaluates all seven flow quantities at the given packed state.
    ///
    /// Deforestation takes the minimum of the shortage-driven demand for
    /// new cropland and a cap of one quarter of the remaining forest, and
    /// only then divides by `intensity`. The `max(fertility, 1)` guard
    /// keeps the shortage term bounded as fertility collapses toward zero.
    ///
    /// `agricultural_land / forest` is left unguarded at `forest == 0`:
    /// an infinite ratio is absorbed by the `min(2, _)` cap, and IEEE min
    /// ignores a NaN from `0/0`, so fertility losses stay finite there.
    pub fn flows<T: Scalar>(&self, x: &[T]) -> Flows<T> {
        let intensity = T::from_f64(self.params.intensity).unwrap();
        let emigration_ratio = T::from_f64(self.params.emigration_ratio).unwrap();
        let consumed = T::from_f64(self.params.consumed_food_per_person).unwrap();
        let natural_rate = T::from_f64(self.params.natural_increase_rate).unwrap();

        let forest = x[FOREST];
        let agricultural_land = x[AGRICULTURAL_LAND];
        let fertility = x[FERTILITY];
        let population = x[POPULATION];

        let food_produced = fertility * agricultural_land;
        let demand_for_food = consumed * population;
        // Positive gap = shortage, negative = surplus.
        let gap = demand_for_food - food_produced;

        let quarter_forest = forest / T::from_f64(4.0).unwrap();
        let deforestation = (gap / fertility.max(T::one())).min(quarter_forest) / intensity;

        let ratio = agricultural_land / forest;
        let pressure = ratio.powf(T::from_f64(1.5).unwrap());
        let fertility_losses =
            fertility * T::from_f64(2.0).unwrap().min(pressure) / intensity;

        let population_natural_increase = population * natural_rate;
        let emigration = gap / consumed * emigration_ratio;

        Flows {
            deforestation,
            fertility_losses,
            food_produced,
            demand_for_food,
            gap,
            emigration,
            population_natural_increase,
        }
    }

    /// Diagnostics at a trajectory point. Always evaluated at the point
    /// itself, never at an intermediate solver stage.
    pub fn diagnostics(&self, _t: f64, state: &State) -> Diagnostics {
        self.flows(&state.to_array())
    }
}

impl<T: Scalar> VectorField<T> for LandUseModel {
    fn dimension(&self) -> usize {
        STATE_DIM
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        let flows = self.flows(x);
        out[FOREST] = -flows.deforestation;
        out[AGRICULTURAL_LAND] = flows.deforestation;
        out[FERTILITY] = -flows.fertility_losses;
        out[POPULATION] = flows.population_natural_increase - flows.emigration;
    }
}
