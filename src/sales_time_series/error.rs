use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeSeriesError {
    #[error("Invalid granularity '{0}'. Must be one of: day, week, month")]
    InvalidGranularity(String),

    #[error("Invalid groupBy '{0}'. Must be one of: user, group")]
    InvalidGroupBy(String),

    #[error("Invalid {field} '{value}'. Expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate { field: &'static str, value: String },

    #[error("Failed to format time series row: {0}")]
    Format(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl TimeSeriesError {
    /// Caller-supplied input was rejected; no query was executed
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TimeSeriesError::InvalidGranularity(_)
                | TimeSeriesError::InvalidGroupBy(_)
                | TimeSeriesError::InvalidDate { .. }
        )
    }
}
