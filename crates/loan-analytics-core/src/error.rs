use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanAnalyticsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanAnalyticsError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanAnalyticsError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanAnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        LoanAnalyticsError::SerializationError(e.to_string())
    }
}
