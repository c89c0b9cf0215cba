#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Gemeinsame Typen und Capability-Traits des Spiellern-Kerns.

pub mod action;
pub mod context;
pub mod error;
pub mod predictor;
pub mod state;

pub use action::{ActionCatalog, ActionKind, ActionSpec};
pub use context::{DecisionContext, DecisionResult, DecisionSource};
pub use error::{CoreError, PredictError};
pub use predictor::{Frame, Predictor, PredictorLoader};
pub use state::GameState;
