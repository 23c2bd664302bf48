#![deny(warnings)]

//! Market evolution and population growth trajectory for the simulation
//! engine: the macro-economic random walk (§4.5) and the three-phase
//! piecewise-exponential growth controller (§4.6) that decides how many
//! users to add each simulated day.

pub mod growth;
pub mod market;

pub use growth::GrowthController;
pub use market::MarketModel;
