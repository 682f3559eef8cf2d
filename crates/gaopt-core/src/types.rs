use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::GaOptError;
use crate::GaOptResult;

/// Frequency of price observations, used to annualise return statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl ReturnFrequency {
    /// Number of periods in a year for annualisation
    pub fn periods_per_year(&self) -> f64 {
        match self {
            ReturnFrequency::Daily => 252.0,
            ReturnFrequency::Weekly => 52.0,
            ReturnFrequency::Monthly => 12.0,
            ReturnFrequency::Quarterly => 4.0,
            ReturnFrequency::Annual => 1.0,
        }
    }
}

/// Historical closing prices: rows are dates, columns are tickers.
///
/// Ticker order is significant. It defines the index of every vector and
/// matrix downstream and is preserved in the reported composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceMatrix {
    pub tickers: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// closes[row][col]; None marks a missing observation for that ticker
    pub closes: Vec<Vec<Option<f64>>>,
}

impl PriceMatrix {
    /// Build a price matrix, sorting rows by date and checking that the
    /// grid is rectangular.
    pub fn new(
        tickers: Vec<String>,
        dates: Vec<NaiveDate>,
        closes: Vec<Vec<Option<f64>>>,
    ) -> GaOptResult<Self> {
        if dates.len() != closes.len() {
            return Err(GaOptError::InvalidInput {
                field: "closes".into(),
                reason: format!(
                    "{} rows of closes for {} dates",
                    closes.len(),
                    dates.len()
                ),
            });
        }
        for (i, row) in closes.iter().enumerate() {
            if row.len() != tickers.len() {
                return Err(GaOptError::InvalidInput {
                    field: "closes".into(),
                    reason: format!(
                        "row {} has {} entries for {} tickers",
                        i,
                        row.len(),
                        tickers.len()
                    ),
                });
            }
        }

        let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> =
            dates.into_iter().zip(closes).collect();
        rows.sort_by_key(|(date, _)| *date);
        let (dates, closes) = rows.into_iter().unzip();

        Ok(PriceMatrix {
            tickers,
            dates,
            closes,
        })
    }

    pub fn num_assets(&self) -> usize {
        self.tickers.len()
    }

    pub fn num_rows(&self) -> usize {
        self.dates.len()
    }

    /// Inner-join alignment: drop every row where any ticker is missing or
    /// non-finite. Non-aligned series would corrupt the covariance estimate.
    pub fn aligned_closes(&self) -> Vec<Vec<f64>> {
        self.closes
            .iter()
            .filter_map(|row| {
                let mut out = Vec::with_capacity(row.len());
                for cell in row {
                    match cell {
                        Some(v) if v.is_finite() => out.push(*v),
                        _ => return None,
                    }
                }
                Some(out)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = PriceMatrix::new(
            vec!["A".into(), "B".into()],
            vec![date(1)],
            vec![vec![Some(1.0)]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_row_count_mismatch() {
        let result = PriceMatrix::new(
            vec!["A".into()],
            vec![date(1), date(2)],
            vec![vec![Some(1.0)]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rows_sorted_by_date() {
        let pm = PriceMatrix::new(
            vec!["A".into()],
            vec![date(3), date(1), date(2)],
            vec![vec![Some(3.0)], vec![Some(1.0)], vec![Some(2.0)]],
        )
        .unwrap();
        assert_eq!(pm.dates, vec![date(1), date(2), date(3)]);
        assert_eq!(pm.closes, vec![vec![Some(1.0)], vec![Some(2.0)], vec![Some(3.0)]]);
    }

    #[test]
    fn test_aligned_closes_drops_incomplete_rows() {
        let pm = PriceMatrix::new(
            vec!["A".into(), "B".into()],
            vec![date(1), date(2), date(3)],
            vec![
                vec![Some(1.0), Some(2.0)],
                vec![Some(1.1), None],
                vec![Some(1.2), Some(2.2)],
            ],
        )
        .unwrap();
        let aligned = pm.aligned_closes();
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0], vec![1.0, 2.0]);
        assert_eq!(aligned[1], vec![1.2, 2.2]);
    }

    #[test]
    fn test_aligned_closes_drops_non_finite() {
        let pm = PriceMatrix::new(
            vec!["A".into()],
            vec![date(1), date(2)],
            vec![vec![Some(f64::NAN)], vec![Some(2.0)]],
        )
        .unwrap();
        assert_eq!(pm.aligned_closes().len(), 1);
    }

    #[test]
    fn test_periods_per_year() {
        assert_eq!(ReturnFrequency::Daily.periods_per_year(), 252.0);
        assert_eq!(ReturnFrequency::Annual.periods_per_year(), 1.0);
    }
}
