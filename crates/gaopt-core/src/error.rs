use thiserror::Error;

#[derive(Debug, Error)]
pub enum GaOptError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GaOptError {
    fn from(e: serde_json::Error) -> Self {
        GaOptError::Serialization(e.to_string())
    }
}
