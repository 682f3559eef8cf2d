mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::frontier::FrontierArgs;
use commands::optimize::OptimizeArgs;
use commands::stats::StatsArgs;

/// Genetic-algorithm portfolio optimization
#[derive(Parser)]
#[command(
    name = "gaopt",
    version,
    about = "Genetic-algorithm portfolio optimization",
    long_about = "Searches the space of long-only, fully-invested portfolio weight \
                  vectors with a genetic algorithm, maximising mean-variance utility \
                  for a given risk aversion. Also reports the convergence trace and a \
                  random-portfolio comparison cloud."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the genetic-algorithm optimizer over a price history
    Optimize(OptimizeArgs),
    /// Estimate annualised return and covariance statistics only
    Stats(StatsArgs),
    /// Sample random portfolios for a risk/return scatter, without the GA
    Frontier(FrontierArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Optimize(args) => commands::optimize::run_optimize(args),
        Commands::Stats(args) => commands::stats::run_stats(args),
        Commands::Frontier(args) => commands::frontier::run_frontier(args),
        Commands::Version => {
            println!("gaopt {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
