use serde::{Deserialize, Serialize};

use crate::error::GaOptError;
use crate::frontier::sampler::FrontierPoint;
use crate::ga::chromosome;
use crate::ga::engine::{ConvergenceHistory, GaOutcome};
use crate::ga::fitness::portfolio_performance;
use crate::stats::estimator::ReturnStatistics;
use crate::GaOptResult;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Headline metrics of the winning portfolio, in the same annualised units
/// as the fitness function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationMetrics {
    pub expected_return: f64,
    pub risk: f64,
    pub fitness: f64,
}

/// One line of the reported composition. `percentage` is a display string
/// derived from `weight`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub ticker: String,
    pub weight: f64,
    pub percentage: String,
}

/// The caller-visible success contract: status, metrics, composition,
/// convergence history, and the frontier scatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub status: String,
    pub metrics: OptimizationMetrics,
    pub composition: Vec<AllocationEntry>,
    pub history: ConvergenceHistory,
    pub efficient_frontier: Vec<FrontierPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// The caller-visible failure contract. Every upstream error funnels into
/// this shape so consumers always receive parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub status: String,
    pub message: String,
}

impl FailureReport {
    pub fn new(error: &GaOptError) -> Self {
        FailureReport {
            status: STATUS_ERROR.into(),
            message: error.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Package the terminated GA's answer into the output contract.
///
/// Re-derives the winner's performance from the same statistics the GA used,
/// appends it to the frontier as the single `is_optimal` point, and lists
/// one composition entry per input ticker in input order.
pub fn assemble(
    tickers: &[String],
    stats: &ReturnStatistics,
    outcome: GaOutcome,
    mut frontier: Vec<FrontierPoint>,
    risk_free_rate: f64,
) -> GaOptResult<OptimizationReport> {
    chromosome::validate(&outcome.best_weights)?;
    if tickers.len() != outcome.best_weights.len() {
        return Err(GaOptError::InvariantViolation(format!(
            "{} weights for {} tickers",
            outcome.best_weights.len(),
            tickers.len()
        )));
    }

    let perf = portfolio_performance(&outcome.best_weights, stats);
    frontier.push(FrontierPoint::from_performance(perf, risk_free_rate, true));

    let composition = tickers
        .iter()
        .zip(&outcome.best_weights)
        .map(|(ticker, &weight)| AllocationEntry {
            ticker: ticker.clone(),
            weight,
            percentage: format!("{:.2}%", weight * 100.0),
        })
        .collect();

    let mut warnings = Vec::new();
    if stats.regularized {
        warnings.push(
            "Covariance matrix was ill-conditioned; diagonal loading was applied".to_string(),
        );
    }

    Ok(OptimizationReport {
        status: STATUS_SUCCESS.into(),
        metrics: OptimizationMetrics {
            expected_return: perf.expected_return,
            risk: perf.risk,
            fitness: outcome.best_fitness,
        },
        composition,
        history: outcome.history,
        efficient_frontier: frontier,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stats(regularized: bool) -> ReturnStatistics {
        ReturnStatistics {
            mean_returns: vec![0.10, 0.04],
            covariance: vec![vec![0.04, 0.01], vec![0.01, 0.02]],
            observations: 100,
            regularized,
        }
    }

    fn outcome() -> GaOutcome {
        GaOutcome {
            best_weights: vec![0.6, 0.4],
            best_fitness: 0.05,
            history: ConvergenceHistory {
                generation: vec![0, 1],
                best_fitness: vec![0.04, 0.05],
                avg_fitness: vec![0.01, 0.02],
            },
        }
    }

    #[test]
    fn test_exactly_one_optimal_point_matching_metrics() {
        let report = assemble(
            &["A".into(), "B".into()],
            &stats(false),
            outcome(),
            vec![],
            0.02,
        )
        .unwrap();
        let optimal: Vec<_> = report
            .efficient_frontier
            .iter()
            .filter(|p| p.is_optimal)
            .collect();
        assert_eq!(optimal.len(), 1);
        assert_eq!(optimal[0].risk, report.metrics.risk);
        assert_eq!(optimal[0].expected_return, report.metrics.expected_return);
    }

    #[test]
    fn test_composition_covers_every_ticker_in_order() {
        let report = assemble(
            &["A".into(), "B".into()],
            &stats(false),
            outcome(),
            vec![],
            0.02,
        )
        .unwrap();
        assert_eq!(report.composition.len(), 2);
        assert_eq!(report.composition[0].ticker, "A");
        assert_eq!(report.composition[1].ticker, "B");
        assert_eq!(report.composition[0].percentage, "60.00%");
        let total: f64 = report.composition.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_success_json_has_contract_keys_only() {
        let report = assemble(
            &["A".into(), "B".into()],
            &stats(false),
            outcome(),
            vec![],
            0.02,
        )
        .unwrap();
        let value = serde_json::to_value(&report).unwrap();
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "composition",
                "efficient_frontier",
                "history",
                "metrics",
                "status"
            ]
        );
        assert_eq!(value["status"], STATUS_SUCCESS);
    }

    #[test]
    fn test_regularization_surfaces_as_warning() {
        let report = assemble(
            &["A".into(), "B".into()],
            &stats(true),
            outcome(),
            vec![],
            0.02,
        )
        .unwrap();
        assert_eq!(report.warnings.len(), 1);
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("warnings").is_some());
    }

    #[test]
    fn test_infeasible_weights_rejected() {
        let mut bad = outcome();
        bad.best_weights = vec![0.7, 0.7];
        let err = assemble(&["A".into(), "B".into()], &stats(false), bad, vec![], 0.02)
            .unwrap_err();
        assert!(matches!(err, GaOptError::InvariantViolation(_)));
    }

    #[test]
    fn test_ticker_count_mismatch_rejected() {
        let err = assemble(&["A".into()], &stats(false), outcome(), vec![], 0.02).unwrap_err();
        assert!(matches!(err, GaOptError::InvariantViolation(_)));
    }

    #[test]
    fn test_failure_report_shape() {
        let error = GaOptError::InsufficientData("too short".into());
        let failure = FailureReport::new(&error);
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["status"], STATUS_ERROR);
        assert!(value["message"]
            .as_str()
            .unwrap()
            .contains("too short"));
    }
}
