use serde::{Deserialize, Serialize};

use crate::stats::estimator::ReturnStatistics;

/// Annualised expected return and standard deviation of a portfolio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    pub expected_return: f64,
    pub risk: f64,
}

/// Expected return `w · μ` and risk `sqrt(wᵀ Σ w)` of a weight vector.
pub fn portfolio_performance(weights: &[f64], stats: &ReturnStatistics) -> PortfolioPerformance {
    let expected_return = dot(weights, &stats.mean_returns);

    let mut variance = 0.0;
    for (i, wi) in weights.iter().enumerate() {
        for (j, wj) in weights.iter().enumerate() {
            variance += wi * wj * stats.covariance[i][j];
        }
    }

    PortfolioPerformance {
        expected_return,
        // Clamp tiny negative variance from floating-point noise.
        risk: variance.max(0.0).sqrt(),
    }
}

/// Mean-variance utility: `expected_return − risk_aversion × risk`.
///
/// Pure function of its inputs. risk_aversion 0 maximises return alone;
/// 1 is the most risk-averse trade-off in the supported range. The value is
/// both the GA's objective and the `fitness` metric in the final report.
pub fn fitness(weights: &[f64], stats: &ReturnStatistics, risk_aversion: f64) -> f64 {
    let perf = portfolio_performance(weights, stats);
    perf.expected_return - risk_aversion * perf.risk
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> ReturnStatistics {
        ReturnStatistics {
            mean_returns: vec![0.10, 0.04],
            covariance: vec![vec![0.04, 0.01], vec![0.01, 0.02]],
            observations: 100,
            regularized: false,
        }
    }

    #[test]
    fn test_performance_hand_calculation() {
        let perf = portfolio_performance(&[0.5, 0.5], &stats());
        assert!((perf.expected_return - 0.07).abs() < 1e-12);
        // wᵀΣw = 0.25*0.04 + 2*0.25*0.01 + 0.25*0.02 = 0.02
        assert!((perf.risk - 0.02f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_asset_corner() {
        let perf = portfolio_performance(&[1.0, 0.0], &stats());
        assert!((perf.expected_return - 0.10).abs() < 1e-12);
        assert!((perf.risk - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_fitness_at_zero_risk_aversion_is_return() {
        let s = stats();
        let f = fitness(&[0.5, 0.5], &s, 0.0);
        assert!((f - 0.07).abs() < 1e-12);
    }

    #[test]
    fn test_risk_aversion_monotonically_penalises_risk() {
        let s = stats();
        let w = [0.5, 0.5];
        let f0 = fitness(&w, &s, 0.0);
        let f_half = fitness(&w, &s, 0.5);
        let f1 = fitness(&w, &s, 1.0);
        assert!(f0 > f_half && f_half > f1);
    }
}
