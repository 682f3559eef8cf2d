pub mod estimator;

pub use estimator::{estimate_statistics, ReturnStatistics, MIN_OBSERVATIONS};
