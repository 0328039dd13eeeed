use crate::models::Metric;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("window size must be at least 1")]
    InvalidWindow,
}

impl AnalysisError {
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("{metric} rating {value} is outside 1..=10")]
    RatingOutOfRange { metric: Metric, value: i64 },

    #[error("unknown weather '{0}'")]
    UnknownWeather(String),

    #[error("unreadable record: {0}")]
    Unreadable(String),
}
