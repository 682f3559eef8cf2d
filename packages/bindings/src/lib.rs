use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use gaopt_core::frontier::{FrontierPoint, DEFAULT_FRONTIER_SAMPLES, DEFAULT_RISK_FREE_RATE};
use gaopt_core::optimizer::{self, OptimizerOptions};
use gaopt_core::report::{FailureReport, OptimizationReport};
use gaopt_core::types::{PriceMatrix, ReturnFrequency};
use gaopt_core::GaOptResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Serialise a domain result. Failures become the error contract rather
/// than a thrown exception so callers always receive parseable JSON.
fn respond<T: Serialize>(result: GaOptResult<T>) -> NapiResult<String> {
    match result {
        Ok(value) => serde_json::to_string(&value).map_err(to_napi_error),
        Err(e) => serde_json::to_string(&FailureReport::new(&e)).map_err(to_napi_error),
    }
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

/// Price-history document shared by every entry point.
#[derive(Deserialize)]
struct PriceDoc {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    closes: Vec<Vec<Option<f64>>>,
}

impl PriceDoc {
    fn into_matrix(self) -> GaOptResult<PriceMatrix> {
        PriceMatrix::new(self.tickers, self.dates, self.closes)
    }
}

#[derive(Deserialize)]
struct OptimizeRequest {
    prices: PriceDoc,
    risk_aversion: f64,
    #[serde(default)]
    options: OptimizerOptions,
}

#[derive(Deserialize)]
struct StatsRequest {
    prices: PriceDoc,
    #[serde(default)]
    frequency: ReturnFrequency,
}

#[derive(Serialize)]
struct StatsResponse {
    tickers: Vec<String>,
    mean_returns: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    observations: usize,
    regularized: bool,
}

#[derive(Deserialize)]
struct FrontierRequest {
    prices: PriceDoc,
    #[serde(default = "default_samples")]
    samples: usize,
    #[serde(default = "default_risk_free_rate")]
    risk_free_rate: f64,
    #[serde(default)]
    frequency: ReturnFrequency,
    #[serde(default)]
    seed: Option<u64>,
}

fn default_samples() -> usize {
    DEFAULT_FRONTIER_SAMPLES
}

fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

#[napi]
pub fn optimize_portfolio(input_json: String) -> NapiResult<String> {
    respond(run_optimize(&input_json))
}

fn run_optimize(input_json: &str) -> GaOptResult<OptimizationReport> {
    let request: OptimizeRequest = serde_json::from_str(input_json)?;
    let matrix = request.prices.into_matrix()?;
    optimizer::optimize(&matrix, request.risk_aversion, &request.options)
}

#[napi]
pub fn estimate_statistics(input_json: String) -> NapiResult<String> {
    respond(run_stats(&input_json))
}

fn run_stats(input_json: &str) -> GaOptResult<StatsResponse> {
    let request: StatsRequest = serde_json::from_str(input_json)?;
    let matrix = request.prices.into_matrix()?;
    let stats = gaopt_core::stats::estimate_statistics(&matrix, request.frequency)?;
    Ok(StatsResponse {
        tickers: matrix.tickers,
        mean_returns: stats.mean_returns,
        covariance: stats.covariance,
        observations: stats.observations,
        regularized: stats.regularized,
    })
}

#[napi]
pub fn sample_frontier(input_json: String) -> NapiResult<String> {
    respond(run_frontier(&input_json))
}

fn run_frontier(input_json: &str) -> GaOptResult<Vec<FrontierPoint>> {
    let request: FrontierRequest = serde_json::from_str(input_json)?;
    let matrix = request.prices.into_matrix()?;
    let stats = gaopt_core::stats::estimate_statistics(&matrix, request.frequency)?;
    let mut rng = match request.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(gaopt_core::frontier::sample_frontier(
        request.samples,
        &stats,
        request.risk_free_rate,
        &mut rng,
    ))
}
