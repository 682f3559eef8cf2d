use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use gaopt_core::stats::estimate_statistics;

use crate::input;

/// Arguments for statistics estimation
#[derive(Args)]
pub struct StatsArgs {
    /// Path to a CSV or JSON file with historical closing prices
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated tickers selecting (and ordering) price columns
    #[arg(long, value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,

    /// Observation frequency: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatsOutput {
    tickers: Vec<String>,
    mean_returns: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    observations: usize,
    regularized: bool,
}

pub fn run_stats(args: StatsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prices = input::load_prices(&args.input, &args.tickers)?;
    let frequency = super::parse_frequency(&args.frequency)?;
    let stats = estimate_statistics(&prices, frequency)?;

    let output = StatsOutput {
        tickers: prices.tickers,
        mean_returns: stats.mean_returns,
        covariance: stats.covariance,
        observations: stats.observations,
        regularized: stats.regularized,
    };
    Ok(serde_json::to_value(output)?)
}
