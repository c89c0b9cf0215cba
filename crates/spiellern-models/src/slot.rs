//! Model slots: named registrations of model artifacts that may or may not
//! be resident in memory.

use serde::Serialize;
use spiellern_core::{GameState, Predictor};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;

/// One registered model.
///
/// Lifecycle: registered (no handle) → loaded (handle present) → possibly
/// active, which is tracked by the registry rather than the slot itself.
pub struct ModelSlot {
    pub name: String,
    pub source_path: PathBuf,
    pub applicable_states: BTreeSet<GameState>,
    pub hotkey: Option<String>,
    pub(crate) handle: Option<Arc<dyn Predictor>>,
    pub loaded: bool,
    /// Wall-clock cost of the last load, for diagnostics.
    pub load_time_ms: f64,
    pub last_used: Option<OffsetDateTime>,
}

impl ModelSlot {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        applicable_states: BTreeSet<GameState>,
        hotkey: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            applicable_states,
            hotkey,
            handle: None,
            loaded: false,
            load_time_ms: 0.0,
            last_used: None,
        }
    }
}

impl fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSlot")
            .field("name", &self.name)
            .field("source_path", &self.source_path)
            .field("loaded", &self.loaded)
            .field("hotkey", &self.hotkey)
            .finish_non_exhaustive()
    }
}

/// Caller-facing snapshot of a slot's state.
#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub name: String,
    pub source_path: String,
    pub loaded: bool,
    pub active: bool,
    pub applicable_states: Vec<GameState>,
    pub hotkey: Option<String>,
}
