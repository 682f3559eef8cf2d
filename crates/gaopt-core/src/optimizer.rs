use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::GaOptError;
use crate::frontier::sampler::{self, DEFAULT_FRONTIER_SAMPLES, DEFAULT_RISK_FREE_RATE};
use crate::ga::engine::{self, GaConfig};
use crate::report::{self, OptimizationReport};
use crate::stats::estimator;
use crate::types::{PriceMatrix, ReturnFrequency};
use crate::GaOptResult;

/// Everything tunable about one optimization run, with defaults matching a
/// responsive interactive call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerOptions {
    #[serde(default)]
    pub ga: GaConfig,
    #[serde(default = "default_frontier_samples")]
    pub frontier_samples: usize,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    #[serde(default)]
    pub frequency: ReturnFrequency,
}

fn default_frontier_samples() -> usize {
    DEFAULT_FRONTIER_SAMPLES
}

fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        OptimizerOptions {
            ga: GaConfig::default(),
            frontier_samples: default_frontier_samples(),
            risk_free_rate: default_risk_free_rate(),
            frequency: ReturnFrequency::default(),
        }
    }
}

/// Run one full optimization: estimate statistics, evolve, sample the
/// frontier, and assemble the report.
///
/// Pure apart from the injected RNG seed: no I/O, no global state, so
/// independent runs may execute concurrently. Input validation happens
/// before any statistics are touched.
pub fn optimize(
    prices: &PriceMatrix,
    risk_aversion: f64,
    options: &OptimizerOptions,
) -> GaOptResult<OptimizationReport> {
    validate_request(prices, risk_aversion)?;

    let stats = estimator::estimate_statistics(prices, options.frequency)?;

    let mut rng = options.ga.rng();
    let outcome = engine::evolve(&stats, risk_aversion, &options.ga, &mut rng)?;
    let frontier = sampler::sample_frontier(
        options.frontier_samples,
        &stats,
        options.risk_free_rate,
        &mut rng,
    );

    report::assemble(
        &prices.tickers,
        &stats,
        outcome,
        frontier,
        options.risk_free_rate,
    )
}

fn validate_request(prices: &PriceMatrix, risk_aversion: f64) -> GaOptResult<()> {
    if prices.tickers.len() < 2 {
        return Err(GaOptError::InvalidInput {
            field: "tickers".into(),
            reason: format!("{} ticker(s) supplied; at least 2 are required", prices.tickers.len()),
        });
    }

    let mut seen = HashSet::new();
    for ticker in &prices.tickers {
        if !seen.insert(ticker.as_str()) {
            return Err(GaOptError::InvalidInput {
                field: "tickers".into(),
                reason: format!("Duplicate ticker '{}'", ticker),
            });
        }
    }

    if !risk_aversion.is_finite() || !(0.0..=1.0).contains(&risk_aversion) {
        return Err(GaOptError::InvalidInput {
            field: "risk_aversion".into(),
            reason: format!("{} is outside [0, 1]", risk_aversion),
        });
    }

    Ok(())
}
