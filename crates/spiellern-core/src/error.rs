use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("health fraction must be within 0.0..=1.0, got {0}")]
    InvalidHealthFraction(f64),
}

/// Failures of the external predictor capability.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("no predictor backend is available")]
    Unavailable,
    #[error("model artifact could not be loaded: {0}")]
    Load(String),
    #[error("prediction backend failed: {0}")]
    Backend(String),
}
