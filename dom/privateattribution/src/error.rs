use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("unknown interaction type: {0:?}")]
    UnknownInteractionType(String),

    /// Malformed request from trusted task configuration.
    #[error("invalid conversion request: {0}")]
    InvalidRequest(&'static str),

    #[error("impression storage failure: {0}")]
    Storage(#[from] anyhow::Error),

    /// The aggregation client rejected or failed to deliver a measurement.
    #[error("measurement submission failed: {0}")]
    Submission(String),
}
