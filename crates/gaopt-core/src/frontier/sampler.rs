use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::ga::chromosome;
use crate::ga::fitness::{portfolio_performance, PortfolioPerformance};
use crate::stats::estimator::ReturnStatistics;

/// Default number of random portfolios in the comparison cloud. Enough for a
/// readable scatter plot without bloating the serialized report.
pub const DEFAULT_FRONTIER_SAMPLES: usize = 300;

/// Annualised risk-free rate used for Sharpe ratios on frontier points.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// One portfolio in the risk/return scatter. The single point with
/// `is_optimal` set is the GA's final answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrontierPoint {
    pub risk: f64,
    #[serde(rename = "return")]
    pub expected_return: f64,
    pub sharpe: f64,
    pub is_optimal: bool,
}

impl FrontierPoint {
    pub(crate) fn from_performance(
        perf: PortfolioPerformance,
        risk_free_rate: f64,
        is_optimal: bool,
    ) -> Self {
        let sharpe = if perf.risk > 0.0 {
            (perf.expected_return - risk_free_rate) / perf.risk
        } else {
            0.0
        };
        FrontierPoint {
            risk: perf.risk,
            expected_return: perf.expected_return,
            sharpe,
            is_optimal,
        }
    }
}

/// Sample `count` independent random portfolios and evaluate their
/// risk/return pairs. Diagnostic context for the GA's answer, not part of
/// the search itself.
pub fn sample_frontier(
    count: usize,
    stats: &ReturnStatistics,
    risk_free_rate: f64,
    rng: &mut StdRng,
) -> Vec<FrontierPoint> {
    (0..count)
        .map(|_| {
            let weights = chromosome::random_weights(stats.num_assets(), rng);
            FrontierPoint::from_performance(
                portfolio_performance(&weights, stats),
                risk_free_rate,
                false,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn stats() -> ReturnStatistics {
        ReturnStatistics {
            mean_returns: vec![0.12, 0.06],
            covariance: vec![vec![0.05, 0.01], vec![0.01, 0.02]],
            observations: 100,
            regularized: false,
        }
    }

    #[test]
    fn test_sample_count_and_flags() {
        let mut rng = StdRng::seed_from_u64(3);
        let points = sample_frontier(50, &stats(), DEFAULT_RISK_FREE_RATE, &mut rng);
        assert_eq!(points.len(), 50);
        assert!(points.iter().all(|p| !p.is_optimal));
        assert!(points.iter().all(|p| p.risk > 0.0));
    }

    #[test]
    fn test_sharpe_formula() {
        let perf = PortfolioPerformance {
            expected_return: 0.10,
            risk: 0.20,
        };
        let point = FrontierPoint::from_performance(perf, 0.02, true);
        assert!((point.sharpe - 0.4).abs() < 1e-12);
        assert!(point.is_optimal);
    }

    #[test]
    fn test_zero_risk_sharpe_is_zero() {
        let perf = PortfolioPerformance {
            expected_return: 0.10,
            risk: 0.0,
        };
        let point = FrontierPoint::from_performance(perf, 0.02, false);
        assert_eq!(point.sharpe, 0.0);
    }

    #[test]
    fn test_seeded_sampling_reproduces() {
        let mut rng_a = StdRng::seed_from_u64(9);
        let mut rng_b = StdRng::seed_from_u64(9);
        let a = sample_frontier(10, &stats(), 0.02, &mut rng_a);
        let b = sample_frontier(10, &stats(), 0.02, &mut rng_b);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.risk, y.risk);
            assert_eq!(x.expected_return, y.expected_return);
        }
    }

    #[test]
    fn test_return_key_serialized_name() {
        let point = FrontierPoint {
            risk: 0.1,
            expected_return: 0.2,
            sharpe: 1.8,
            is_optimal: false,
        };
        let value = serde_json::to_value(point).unwrap();
        assert!(value.get("return").is_some());
        assert!(value.get("expected_return").is_none());
    }
}
