use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::error::GaOptError;
use crate::ga::chromosome;
use crate::ga::fitness::fitness;
use crate::stats::estimator::ReturnStatistics;
use crate::GaOptResult;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Genetic algorithm parameters.
///
/// Runtime is bounded deterministically by
/// `generations × population_size × num_assets`, so no internal timeout is
/// needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Contestants per tournament. Larger values increase selection pressure
    /// but selection stays stochastic for any size below the population.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Probability that a child is a blend of both parents rather than a
    /// pass-through copy of the first.
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Per-gene probability of Gaussian perturbation.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Standard deviation of the mutation noise.
    #[serde(default = "default_mutation_strength")]
    pub mutation_strength: f64,
    /// Chromosomes carried unchanged into the next generation.
    #[serde(default = "default_elite_count")]
    pub elite_count: usize,
    /// Seed for reproducible runs; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_population_size() -> usize {
    100
}
fn default_generations() -> usize {
    50
}
fn default_tournament_size() -> usize {
    3
}
fn default_crossover_rate() -> f64 {
    0.9
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_mutation_strength() -> f64 {
    0.2
}
fn default_elite_count() -> usize {
    2
}

impl Default for GaConfig {
    fn default() -> Self {
        GaConfig {
            population_size: default_population_size(),
            generations: default_generations(),
            tournament_size: default_tournament_size(),
            crossover_rate: default_crossover_rate(),
            mutation_rate: default_mutation_rate(),
            mutation_strength: default_mutation_strength(),
            elite_count: default_elite_count(),
            seed: None,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> GaOptResult<()> {
        if self.generations == 0 {
            return Err(invalid("generations", "must be at least 1"));
        }
        if self.population_size < 2 {
            return Err(invalid("population_size", "must be at least 2"));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(invalid(
                "tournament_size",
                "must be between 1 and population_size",
            ));
        }
        if self.elite_count >= self.population_size {
            return Err(invalid("elite_count", "must be below population_size"));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(invalid("crossover_rate", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(invalid("mutation_rate", "must be in [0, 1]"));
        }
        if !self.mutation_strength.is_finite() || self.mutation_strength <= 0.0 {
            return Err(invalid("mutation_strength", "must be positive"));
        }
        Ok(())
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn invalid(field: &str, reason: &str) -> GaOptError {
    GaOptError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Per-generation convergence trace. Three equal-length append-only arrays;
/// `generation` runs 0..N-1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    pub generation: Vec<usize>,
    pub best_fitness: Vec<f64>,
    pub avg_fitness: Vec<f64>,
}

/// Result of one evolution run: the best chromosome ever evaluated, its
/// fitness, and the convergence trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaOutcome {
    pub best_weights: Vec<f64>,
    pub best_fitness: f64,
    pub history: ConvergenceHistory,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evolve a population of portfolios toward maximum mean-variance utility.
///
/// One generation is evaluate → record → elitism → select → crossover →
/// mutate → repair. Termination is the fixed generation budget alone, so the
/// history length always equals `config.generations`. The best-so-far
/// chromosome is threaded through the loop and returned; no state outlives
/// the call, so concurrent independent runs are safe by construction.
pub fn evolve(
    stats: &ReturnStatistics,
    risk_aversion: f64,
    config: &GaConfig,
    rng: &mut StdRng,
) -> GaOptResult<GaOutcome> {
    config.validate()?;
    let num_assets = stats.num_assets();
    if num_assets < 2 {
        return Err(invalid("statistics", "at least 2 assets are required"));
    }

    let noise = Normal::new(0.0, config.mutation_strength).map_err(|e| {
        invalid("mutation_strength", &format!("invalid noise distribution: {e}"))
    })?;

    let mut population: Vec<Vec<f64>> = (0..config.population_size)
        .map(|_| chromosome::random_weights(num_assets, rng))
        .collect();

    let mut best_weights: Vec<f64> = Vec::new();
    let mut best_fitness = f64::NEG_INFINITY;
    let mut history = ConvergenceHistory {
        generation: Vec::with_capacity(config.generations),
        best_fitness: Vec::with_capacity(config.generations),
        avg_fitness: Vec::with_capacity(config.generations),
    };

    for generation in 0..config.generations {
        let fits: Vec<f64> = population
            .iter()
            .map(|w| fitness(w, stats, risk_aversion))
            .collect();

        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_unstable_by(|&a, &b| {
            fits[b].partial_cmp(&fits[a]).unwrap_or(Ordering::Equal)
        });

        let gen_best = fits[order[0]];
        let gen_avg = fits.iter().sum::<f64>() / fits.len() as f64;
        if gen_best > best_fitness {
            best_fitness = gen_best;
            best_weights = population[order[0]].clone();
        }
        history.generation.push(generation);
        history.best_fitness.push(gen_best);
        history.avg_fitness.push(gen_avg);

        if generation + 1 == config.generations {
            break;
        }

        // Elites pass unchanged, which makes the per-generation best
        // non-decreasing.
        let mut next: Vec<Vec<f64>> = order
            .iter()
            .take(config.elite_count)
            .map(|&i| population[i].clone())
            .collect();

        while next.len() < config.population_size {
            let parent_1 = tournament_selection(&population, &fits, config.tournament_size, rng);
            let parent_2 = tournament_selection(&population, &fits, config.tournament_size, rng);

            let mut child = if rng.gen_bool(config.crossover_rate) {
                crossover(parent_1, parent_2, rng)
            } else {
                parent_1.to_vec()
            };
            mutate(&mut child, config.mutation_rate, noise, rng);
            chromosome::repair(&mut child);
            next.push(child);
        }
        population = next;
    }

    chromosome::validate(&best_weights)?;
    Ok(GaOutcome {
        best_weights,
        best_fitness,
        history,
    })
}

// ---------------------------------------------------------------------------
// Genetic operators
// ---------------------------------------------------------------------------

/// Pick `k` distinct contestants at random and return the fittest. Higher
/// fitness is strictly more likely to win, but any chromosome can be drawn.
fn tournament_selection<'a>(
    population: &'a [Vec<f64>],
    fits: &[f64],
    k: usize,
    rng: &mut StdRng,
) -> &'a [f64] {
    let mut winner = 0usize;
    let mut winner_fitness = f64::NEG_INFINITY;
    for idx in index::sample(rng, population.len(), k) {
        if fits[idx] > winner_fitness {
            winner_fitness = fits[idx];
            winner = idx;
        }
    }
    &population[winner]
}

/// Per-gene arithmetic blend with an independent random alpha per gene.
fn crossover(parent_1: &[f64], parent_2: &[f64], rng: &mut StdRng) -> Vec<f64> {
    parent_1
        .iter()
        .zip(parent_2.iter())
        .map(|(&w1, &w2)| {
            let alpha: f64 = rng.gen_range(0.0..1.0);
            alpha * w1 + (1.0 - alpha) * w2
        })
        .collect()
}

/// Gaussian perturbation per gene. Feasibility is restored by the repair
/// step that always follows.
fn mutate(weights: &mut [f64], mutation_rate: f64, noise: Normal, rng: &mut StdRng) {
    for w in weights.iter_mut() {
        if rng.gen_bool(mutation_rate) {
            *w += rng.sample(noise);
        }
    }
}
