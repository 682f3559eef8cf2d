use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use gaopt_core::frontier::sample_frontier;
use gaopt_core::stats::estimate_statistics;

use crate::input;

/// Arguments for frontier sampling
#[derive(Args)]
pub struct FrontierArgs {
    /// Path to a CSV or JSON file with historical closing prices
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated tickers selecting (and ordering) price columns
    #[arg(long, value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,

    /// Number of random portfolios to sample
    #[arg(long, default_value = "300")]
    pub samples: usize,

    /// Annualised risk-free rate used for Sharpe ratios
    #[arg(long, default_value = "0.02")]
    pub risk_free_rate: f64,

    /// Seed for a reproducible sample
    #[arg(long)]
    pub seed: Option<u64>,

    /// Observation frequency: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: String,
}

pub fn run_frontier(args: FrontierArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prices = input::load_prices(&args.input, &args.tickers)?;
    let frequency = super::parse_frequency(&args.frequency)?;
    let stats = estimate_statistics(&prices, frequency)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let points = sample_frontier(args.samples, &stats, args.risk_free_rate, &mut rng);
    Ok(serde_json::to_value(points)?)
}
