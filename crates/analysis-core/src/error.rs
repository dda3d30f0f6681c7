use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A collaborator could not supply a required input.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Insufficient history: need {needed} bars, have {available}")]
    InsufficientHistory { needed: usize, available: usize },

    /// No component produced a usable score.
    #[error("No usable signal: {0}")]
    AllComponentsUndefined(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The analysis task for a symbol panicked or was cancelled.
    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
}

impl AnalysisError {
    /// True when the failure means "no data for this symbol" as opposed to a
    /// computed-but-unusable result.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            AnalysisError::DataUnavailable(_) | AnalysisError::InsufficientHistory { .. }
        )
    }
}
