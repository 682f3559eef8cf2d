pub mod chromosome;
pub mod engine;
pub mod fitness;

pub use engine::{evolve, ConvergenceHistory, GaConfig, GaOutcome};
pub use fitness::{fitness, portfolio_performance, PortfolioPerformance};
