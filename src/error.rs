//! Error type shared by the validator, projector, and loaders

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IllustrationError {
    /// One or more business-rule violations, always the complete list
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Bulk-path record with required fields absent
    #[error("Missing required fields: {}", .0.join(", "))]
    IncompleteRecord(Vec<String>),

    /// Arithmetic on data that bypassed validation
    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    /// An amount left the representable decimal range
    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Policy term of {years} years exceeds the projection limit of {limit}")]
    TermTooLong { years: u32, limit: u32 },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown premium frequency: {0}")]
    UnknownFrequency(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IllustrationError>;
