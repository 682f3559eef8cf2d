use clap::Args;
use serde_json::Value;

use gaopt_core::optimizer::{optimize, OptimizerOptions};

use crate::input;

/// Arguments for a full optimization run
#[derive(Args)]
pub struct OptimizeArgs {
    /// Path to a CSV or JSON file with historical closing prices
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated tickers selecting (and ordering) price columns
    #[arg(long, value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,

    /// Risk aversion in [0, 1]: 0 maximises return, 1 is most risk-averse
    #[arg(long, default_value = "0.5")]
    pub risk_aversion: f64,

    /// Generation budget; also the length of the reported history
    #[arg(long, default_value = "50")]
    pub generations: usize,

    /// Population size
    #[arg(long, default_value = "100")]
    pub population: usize,

    /// Per-gene mutation probability
    #[arg(long, default_value = "0.1")]
    pub mutation_rate: f64,

    /// Probability of blending both parents instead of copying one
    #[arg(long, default_value = "0.9")]
    pub crossover_rate: f64,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Random portfolios sampled for the efficient-frontier scatter
    #[arg(long, default_value = "300")]
    pub frontier_samples: usize,

    /// Annualised risk-free rate used for Sharpe ratios
    #[arg(long, default_value = "0.02")]
    pub risk_free_rate: f64,

    /// Observation frequency: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: String,
}

pub fn run_optimize(args: OptimizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prices = input::load_prices(&args.input, &args.tickers)?;

    let mut options = OptimizerOptions::default();
    options.ga.generations = args.generations;
    options.ga.population_size = args.population;
    options.ga.mutation_rate = args.mutation_rate;
    options.ga.crossover_rate = args.crossover_rate;
    options.ga.seed = args.seed;
    options.frontier_samples = args.frontier_samples;
    options.risk_free_rate = args.risk_free_rate;
    options.frequency = super::parse_frequency(&args.frequency)?;

    let report = optimize(&prices, args.risk_aversion, &options)?;
    Ok(serde_json::to_value(report)?)
}
