//! Monte Carlo simulation of finishing order

pub mod monte_carlo;
pub mod rank;

pub use monte_carlo::{simulate, SimulationOptions, SimulationReport};
pub use rank::RankStats;
