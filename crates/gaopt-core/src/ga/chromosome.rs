use rand::rngs::StdRng;
use rand::Rng;

use crate::error::GaOptError;
use crate::GaOptResult;

/// Tolerance on the unit-sum constraint.
pub const SIMPLEX_TOLERANCE: f64 = 1e-6;

/// Draw a random chromosome: iid Uniform(0,1) weights normalised to sum 1.
///
/// Every point of the simplex is reachable, so the search space is fully
/// covered by initialization alone.
pub fn random_weights(num_assets: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut weights: Vec<f64> = (0..num_assets).map(|_| rng.gen_range(0.0..1.0)).collect();
    let total: f64 = weights.iter().sum();
    if total <= f64::EPSILON {
        return equal_weights(num_assets);
    }
    weights.iter_mut().for_each(|w| *w /= total);
    weights
}

pub fn equal_weights(num_assets: usize) -> Vec<f64> {
    vec![1.0 / num_assets as f64; num_assets]
}

/// Project a weight vector onto the feasible simplex: clip negatives to
/// zero and renormalise to sum 1. An all-zero vector projects to equal
/// weights. Applied unconditionally after every genetic operator.
pub fn repair(weights: &mut [f64]) {
    for w in weights.iter_mut() {
        if !w.is_finite() || *w < 0.0 {
            *w = 0.0;
        }
    }
    let total: f64 = weights.iter().sum();
    if total <= f64::EPSILON {
        let n = weights.len().max(1);
        weights.iter_mut().for_each(|w| *w = 1.0 / n as f64);
    } else {
        weights.iter_mut().for_each(|w| *w /= total);
    }
}

/// Check the simplex constraints. A violation here means repair was skipped
/// somewhere, which would corrupt reported weights, so it is fatal.
pub fn validate(weights: &[f64]) -> GaOptResult<()> {
    if weights.is_empty() {
        return Err(GaOptError::InvariantViolation(
            "Empty weight vector".into(),
        ));
    }
    for (i, w) in weights.iter().enumerate() {
        if !w.is_finite() || *w < 0.0 {
            return Err(GaOptError::InvariantViolation(format!(
                "Weight {} is {} after repair",
                i, w
            )));
        }
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > SIMPLEX_TOLERANCE {
        return Err(GaOptError::InvariantViolation(format!(
            "Weights sum to {} after repair",
            total
        )));
    }
    Ok(())
}
