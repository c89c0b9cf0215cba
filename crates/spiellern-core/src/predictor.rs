//! Predictor capability traits.
//!
//! The inference runtime that executes a model's forward pass is an external
//! collaborator. This core only sees an opaque [`Predictor`] that maps an
//! image-like [`Frame`] to an ordered action-probability vector, and a
//! [`PredictorLoader`] that turns a model artifact path into such a
//! predictor. Backend selection (ONNX, Torch, …) is entirely the loader's
//! concern.

use crate::error::PredictError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Opaque image-like input for a prediction.
///
/// Pixels are packed row-major; the exact channel layout is a contract
/// between the capture layer and the predictor backend, not this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f32>,
}

impl Frame {
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<f32>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// A loaded model capable of producing action probabilities.
pub trait Predictor: Send + Sync {
    /// Run one forward pass. The returned vector is ordered by action index
    /// and has one entry per action the model knows about.
    fn predict(&self, frame: &Frame) -> Result<Vec<f64>, PredictError>;
}

/// Capability that materializes a [`Predictor`] from a model artifact path.
///
/// Loading and parsing the artifact (file format, device placement, warmup)
/// is delegated entirely to the implementation.
pub trait PredictorLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Arc<dyn Predictor>, PredictError>;
}
