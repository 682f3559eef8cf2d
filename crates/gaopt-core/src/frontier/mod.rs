pub mod sampler;

pub use sampler::{sample_frontier, FrontierPoint, DEFAULT_FRONTIER_SAMPLES, DEFAULT_RISK_FREE_RATE};
