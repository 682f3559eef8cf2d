use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use gaopt_core::PriceMatrix;

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read closing prices from CSV. The first column must be `date` in
/// `YYYY-MM-DD` form; every other header names a ticker. Empty cells
/// mark missing observations.
pub fn read_prices_csv(path: &str) -> Result<PriceMatrix, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut reader = csv::Reader::from_path(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let headers = reader.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some(first) if first.eq_ignore_ascii_case("date") => {}
        _ => return Err("CSV must start with a 'date' column".into()),
    }
    let tickers: Vec<String> = columns.map(|h| h.trim().to_string()).collect();
    if tickers.is_empty() {
        return Err("CSV has no ticker columns after 'date'".into());
    }

    let mut dates = Vec::new();
    let mut closes = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        let mut cells = record.iter();
        let date_cell = cells
            .next()
            .ok_or_else(|| format!("Row {} is empty", row_idx + 1))?;
        let date = NaiveDate::parse_from_str(date_cell.trim(), "%Y-%m-%d")
            .map_err(|e| format!("Row {}: bad date '{}': {}", row_idx + 1, date_cell, e))?;

        let mut row = Vec::with_capacity(tickers.len());
        for cell in cells {
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                row.push(None);
            } else {
                let close: f64 = trimmed.parse().map_err(|e| {
                    format!("Row {}: bad close '{}': {}", row_idx + 1, trimmed, e)
                })?;
                row.push(Some(close));
            }
        }
        dates.push(date);
        closes.push(row);
    }

    Ok(PriceMatrix::new(tickers, dates, closes)?)
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    // Basic existence check
    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
