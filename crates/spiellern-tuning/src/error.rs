use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("parameter is locked: {0}")]
    LockedParameter(String),
    #[error("{field} must be within 0.0..=1.0, got {value}")]
    MetricOutOfRange { field: &'static str, value: f64 },
    #[error("invalid parameter definition: {0}")]
    InvalidParameter(String),
    #[error("tuning state could not be persisted: {0}")]
    Io(#[from] std::io::Error),
    #[error("tuning state could not be serialized: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TuningError>;
