pub mod error;
pub mod frontier;
pub mod ga;
pub mod optimizer;
pub mod report;
pub mod stats;
pub mod types;

pub use error::GaOptError;
pub use optimizer::{optimize, OptimizerOptions};
pub use types::*;

/// Standard result type for all optimizer operations
pub type GaOptResult<T> = Result<T, GaOptError>;
