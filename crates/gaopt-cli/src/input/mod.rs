pub mod file;
pub mod stdin;

use chrono::NaiveDate;
use serde::Deserialize;

use gaopt_core::PriceMatrix;

/// JSON price-history document: same shape the core serialises.
#[derive(Debug, Deserialize)]
struct PriceFile {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    closes: Vec<Vec<Option<f64>>>,
}

impl PriceFile {
    fn into_matrix(self) -> Result<PriceMatrix, Box<dyn std::error::Error>> {
        Ok(PriceMatrix::new(self.tickers, self.dates, self.closes)?)
    }
}

/// Load a price matrix from `--input` (CSV by extension, JSON otherwise)
/// or from JSON piped on stdin. An optional ticker list selects and
/// reorders columns.
pub fn load_prices(
    input: &Option<String>,
    tickers: &Option<Vec<String>>,
) -> Result<PriceMatrix, Box<dyn std::error::Error>> {
    let matrix = match input {
        Some(path) if path.to_lowercase().ends_with(".csv") => file::read_prices_csv(path)?,
        Some(path) => {
            let parsed: PriceFile = file::read_json(path)?;
            parsed.into_matrix()?
        }
        None => match stdin::read_stdin()? {
            Some(value) => {
                let parsed: PriceFile = serde_json::from_value(value)?;
                parsed.into_matrix()?
            }
            None => {
                return Err(
                    "No input provided. Pass --input <file> or pipe JSON via stdin".into(),
                )
            }
        },
    };

    match tickers {
        Some(wanted) if !wanted.is_empty() => select_tickers(matrix, wanted),
        _ => Ok(matrix),
    }
}

/// Keep only the requested tickers, in the requested order.
fn select_tickers(
    matrix: PriceMatrix,
    wanted: &[String],
) -> Result<PriceMatrix, Box<dyn std::error::Error>> {
    let mut indices = Vec::with_capacity(wanted.len());
    for ticker in wanted {
        match matrix.tickers.iter().position(|t| t == ticker) {
            Some(idx) => indices.push(idx),
            None => {
                return Err(format!(
                    "Unknown ticker '{}'. Available: {}",
                    ticker,
                    matrix.tickers.join(", ")
                )
                .into())
            }
        }
    }

    let closes = matrix
        .closes
        .iter()
        .map(|row| indices.iter().map(|&i| row[i]).collect())
        .collect();
    Ok(PriceMatrix::new(wanted.to_vec(), matrix.dates, closes)?)
}
