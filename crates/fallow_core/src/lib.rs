//! The `fallow_core` crate is the simulation engine for a coupled
//! land-use model: forest area, cropland, soil fertility, and population
//! evolving under fixed feedback rules over long horizons.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction), `VectorField`
//!   (continuous-time systems), `Steppable` (fixed-step solvers).
//! - **Solvers**: classical fixed-step RK4.
//! - **Model**: the land-use flow equations and their per-step
//!   diagnostics.
//! - **Simulate**: grid validation, the integration driver, and
//!   trajectory assembly.
//!
//! A run is strictly sequential inside (each step consumes the previous
//! step's state), but runs share nothing: batch parameter sweeps are
//! embarrassingly parallel at the whole-run level.

pub mod grid;
pub mod model;
pub mod simulate;
pub mod solvers;
pub mod traits;
