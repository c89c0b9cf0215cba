use spiellern_core::PredictError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("no model is currently active")]
    NoActiveModel,
    #[error(transparent)]
    Predict(#[from] PredictError),
}

pub type Result<T> = std::result::Result<T, SwapError>;
