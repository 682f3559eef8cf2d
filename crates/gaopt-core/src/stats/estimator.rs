use serde::{Deserialize, Serialize};

use crate::error::GaOptError;
use crate::types::{PriceMatrix, ReturnFrequency};
use crate::GaOptResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Minimum aligned return observations required to estimate a covariance
/// matrix meaningfully.
pub const MIN_OBSERVATIONS: usize = 20;

/// Diagonal loading applied to an ill-conditioned covariance matrix,
/// relative to the mean of its diagonal.
const RIDGE_SCALE: f64 = 1e-8;

/// An off-diagonal correlation this close to ±1 marks the matrix as
/// near-singular.
const CORRELATION_LIMIT: f64 = 1.0 - 1e-6;

/// Annualised return statistics derived from a price matrix.
///
/// Computed once per optimization run and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStatistics {
    /// Annualised mean return per ticker, in input ticker order.
    pub mean_returns: Vec<f64>,
    /// Annualised unbiased sample covariance matrix.
    pub covariance: Vec<Vec<f64>>,
    /// Number of aligned return observations used.
    pub observations: usize,
    /// True when diagonal loading was applied to an ill-conditioned matrix.
    pub regularized: bool,
}

impl ReturnStatistics {
    pub fn num_assets(&self) -> usize {
        self.mean_returns.len()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Estimate annualised mean returns and covariance from aligned closes.
///
/// Simple per-period returns are computed over the inner-joined rows of the
/// price matrix; column means and the unbiased sample covariance are then
/// scaled by the periods-per-year factor so every downstream consumer works
/// in the same annualised unit.
pub fn estimate_statistics(
    prices: &PriceMatrix,
    frequency: ReturnFrequency,
) -> GaOptResult<ReturnStatistics> {
    let n_assets = prices.num_assets();
    if n_assets < 2 {
        return Err(GaOptError::InvalidInput {
            field: "tickers".into(),
            reason: "At least 2 tickers are required to estimate a covariance matrix".into(),
        });
    }

    for (col, ticker) in prices.tickers.iter().enumerate() {
        let has_data = prices
            .closes
            .iter()
            .any(|row| matches!(row[col], Some(v) if v.is_finite()));
        if !has_data {
            return Err(GaOptError::InsufficientData(format!(
                "Ticker '{}' has no price observations",
                ticker
            )));
        }
    }

    let aligned = prices.aligned_closes();
    if aligned.len() < MIN_OBSERVATIONS + 1 {
        return Err(GaOptError::InsufficientData(format!(
            "{} aligned price rows after dropping incomplete dates; at least {} are required",
            aligned.len(),
            MIN_OBSERVATIONS + 1
        )));
    }

    // Simple per-period returns.
    let mut returns: Vec<Vec<f64>> = Vec::with_capacity(aligned.len() - 1);
    for window in aligned.windows(2) {
        let (prev, curr) = (&window[0], &window[1]);
        let mut row = Vec::with_capacity(n_assets);
        for col in 0..n_assets {
            if prev[col] <= 0.0 {
                return Err(GaOptError::InsufficientData(format!(
                    "Non-positive close for ticker '{}'",
                    prices.tickers[col]
                )));
            }
            row.push(curr[col] / prev[col] - 1.0);
        }
        returns.push(row);
    }

    let observations = returns.len();
    let periods = frequency.periods_per_year();
    let obs = observations as f64;

    let mean_periodic: Vec<f64> = (0..n_assets)
        .map(|col| returns.iter().map(|r| r[col]).sum::<f64>() / obs)
        .collect();

    let mean_returns: Vec<f64> = mean_periodic.iter().map(|m| m * periods).collect();

    // Unbiased sample covariance, annualised.
    let mut covariance = vec![vec![0.0; n_assets]; n_assets];
    for i in 0..n_assets {
        for j in i..n_assets {
            let mut sum = 0.0;
            for row in &returns {
                sum += (row[i] - mean_periodic[i]) * (row[j] - mean_periodic[j]);
            }
            let cov = sum / (obs - 1.0) * periods;
            covariance[i][j] = cov;
            covariance[j][i] = cov;
        }
    }

    let mut regularized = false;
    if needs_diagonal_loading(&covariance, observations, n_assets) {
        apply_diagonal_loading(&mut covariance);
        regularized = true;
    }

    let finite = mean_returns.iter().all(|v| v.is_finite())
        && covariance.iter().flatten().all(|v| v.is_finite());
    if !finite {
        return Err(GaOptError::NumericalDegeneracy(
            "Return statistics are not finite".into(),
        ));
    }

    Ok(ReturnStatistics {
        mean_returns,
        covariance,
        observations,
        regularized,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn needs_diagonal_loading(covariance: &[Vec<f64>], observations: usize, n_assets: usize) -> bool {
    // Fewer observations than assets cannot produce a full-rank estimate.
    if observations <= n_assets {
        return true;
    }
    for (i, row) in covariance.iter().enumerate() {
        if row[i] <= 0.0 {
            return true;
        }
    }
    for i in 0..n_assets {
        for j in (i + 1)..n_assets {
            let denom = (covariance[i][i] * covariance[j][j]).sqrt();
            if (covariance[i][j] / denom).abs() >= CORRELATION_LIMIT {
                return true;
            }
        }
    }
    false
}

fn apply_diagonal_loading(covariance: &mut [Vec<f64>]) {
    let n = covariance.len();
    let mean_diag: f64 = (0..n).map(|i| covariance[i][i].max(0.0)).sum::<f64>() / n as f64;
    let ridge = RIDGE_SCALE * mean_diag.max(1.0);
    for (i, row) in covariance.iter_mut().enumerate() {
        row[i] += ridge;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn dates(count: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    fn matrix_from(series: Vec<Vec<Option<f64>>>, tickers: Vec<&str>) -> PriceMatrix {
        let rows = series[0].len();
        let closes = (0..rows)
            .map(|r| series.iter().map(|s| s[r]).collect())
            .collect();
        PriceMatrix::new(
            tickers.into_iter().map(String::from).collect(),
            dates(rows),
            closes,
        )
        .unwrap()
    }

    /// Two assets oscillating out of phase, enough rows to clear the
    /// minimum-observation gate.
    fn well_behaved_matrix(rows: usize) -> PriceMatrix {
        let a: Vec<Option<f64>> = (0..rows)
            .map(|i| Some(100.0 * (1.0 + 0.02 * (i as f64 * 0.9).sin())))
            .collect();
        let b: Vec<Option<f64>> = (0..rows)
            .map(|i| Some(80.0 * (1.0 + 0.015 * (i as f64 * 0.4 + 1.0).cos())))
            .collect();
        matrix_from(vec![a, b], vec!["A", "B"])
    }

    // ------------------------------------------------------------------
    // 1. Input validation
    // ------------------------------------------------------------------
    #[test]
    fn test_single_ticker_rejected() {
        let pm = matrix_from(
            vec![(0..30).map(|i| Some(100.0 + i as f64)).collect()],
            vec!["A"],
        );
        let err = estimate_statistics(&pm, ReturnFrequency::Daily).unwrap_err();
        assert!(matches!(err, GaOptError::InvalidInput { .. }));
    }

    #[test]
    fn test_short_history_rejected() {
        let pm = matrix_from(
            vec![
                (0..10).map(|i| Some(100.0 + i as f64)).collect(),
                (0..10).map(|i| Some(50.0 + i as f64)).collect(),
            ],
            vec!["A", "B"],
        );
        let err = estimate_statistics(&pm, ReturnFrequency::Daily).unwrap_err();
        assert!(matches!(err, GaOptError::InsufficientData(_)));
    }

    #[test]
    fn test_all_missing_column_rejected() {
        let pm = matrix_from(
            vec![
                (0..30).map(|i| Some(100.0 + i as f64)).collect(),
                (0..30).map(|_| None).collect(),
            ],
            vec!["A", "B"],
        );
        let err = estimate_statistics(&pm, ReturnFrequency::Daily).unwrap_err();
        assert!(matches!(err, GaOptError::InsufficientData(_)));
    }

    #[test]
    fn test_non_positive_close_rejected() {
        let mut a: Vec<Option<f64>> = (0..30).map(|i| Some(100.0 + i as f64)).collect();
        a[5] = Some(0.0);
        let b = (0..30).map(|i| Some(50.0 + i as f64)).collect();
        let pm = matrix_from(vec![a, b], vec!["A", "B"]);
        assert!(estimate_statistics(&pm, ReturnFrequency::Daily).is_err());
    }

    // ------------------------------------------------------------------
    // 2. Alignment
    // ------------------------------------------------------------------
    #[test]
    fn test_missing_rows_are_dropped_not_zero_filled() {
        let mut a: Vec<Option<f64>> = (0..32)
            .map(|i| Some(100.0 * (1.0 + 0.02 * (i as f64 * 0.9).sin())))
            .collect();
        let b: Vec<Option<f64>> = (0..32)
            .map(|i| Some(80.0 * (1.0 + 0.015 * (i as f64 * 0.4 + 1.0).cos())))
            .collect();
        a[3] = None;
        a[17] = None;
        let pm = matrix_from(vec![a, b], vec!["A", "B"]);
        let stats = estimate_statistics(&pm, ReturnFrequency::Daily).unwrap();
        // 30 aligned rows leave 29 return observations
        assert_eq!(stats.observations, 29);
    }

    // ------------------------------------------------------------------
    // 3. Point estimates
    // ------------------------------------------------------------------
    #[test]
    fn test_mean_return_matches_hand_calculation() {
        // Constant 1% growth per period: every simple return is exactly 0.01.
        let a: Vec<Option<f64>> = (0..25).map(|i| Some(100.0 * 1.01f64.powi(i))).collect();
        let b: Vec<Option<f64>> = (0..25)
            .map(|i| Some(50.0 * (1.0 + 0.03 * (i as f64 * 0.7).sin())))
            .collect();
        let pm = matrix_from(vec![a, b], vec!["A", "B"]);
        let stats = estimate_statistics(&pm, ReturnFrequency::Annual).unwrap();
        assert!((stats.mean_returns[0] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_annualisation_scales_linearly() {
        let pm = well_behaved_matrix(40);
        let annual = estimate_statistics(&pm, ReturnFrequency::Annual).unwrap();
        let daily = estimate_statistics(&pm, ReturnFrequency::Daily).unwrap();
        assert!((daily.mean_returns[0] - annual.mean_returns[0] * 252.0).abs() < 1e-9);
        assert!((daily.covariance[0][1] - annual.covariance[0][1] * 252.0).abs() < 1e-9);
    }

    #[test]
    fn test_covariance_symmetric() {
        let pm = well_behaved_matrix(40);
        let stats = estimate_statistics(&pm, ReturnFrequency::Daily).unwrap();
        assert_eq!(stats.covariance[0][1], stats.covariance[1][0]);
        assert!(stats.covariance[0][0] > 0.0);
        assert!(!stats.regularized);
    }

    // ------------------------------------------------------------------
    // 4. Degeneracy policy
    // ------------------------------------------------------------------
    #[test]
    fn test_perfectly_correlated_pair_is_regularized() {
        let a: Vec<Option<f64>> = (0..30)
            .map(|i| Some(100.0 * (1.0 + 0.02 * (i as f64 * 0.9).sin())))
            .collect();
        // Exactly twice A: identical returns, correlation 1.
        let b: Vec<Option<f64>> = a.iter().map(|v| v.map(|x| 2.0 * x)).collect();
        let pm = matrix_from(vec![a, b], vec!["A", "B"]);
        let stats = estimate_statistics(&pm, ReturnFrequency::Daily).unwrap();
        assert!(stats.regularized);
        // Loading lands on the diagonal only.
        assert!(stats.covariance[0][0] > 0.0);
    }

    #[test]
    fn test_constant_series_is_regularized() {
        let a: Vec<Option<f64>> = (0..30).map(|_| Some(100.0)).collect();
        let b: Vec<Option<f64>> = (0..30)
            .map(|i| Some(80.0 * (1.0 + 0.015 * (i as f64 * 0.4).cos())))
            .collect();
        let pm = matrix_from(vec![a, b], vec!["A", "B"]);
        let stats = estimate_statistics(&pm, ReturnFrequency::Daily).unwrap();
        assert!(stats.regularized);
        assert!(stats.covariance[0][0] > 0.0);
    }
}
