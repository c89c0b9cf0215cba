//! Switch events: the append-only record of successful model switches.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// What initiated a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchTrigger {
    Manual,
    Auto,
    Hotkey,
}

impl fmt::Display for SwitchTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchTrigger::Manual => write!(f, "manual"),
            SwitchTrigger::Auto => write!(f, "auto"),
            SwitchTrigger::Hotkey => write!(f, "hotkey"),
        }
    }
}

/// Record of one successful switch of the active model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchEvent {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// `None` when no model was active before this switch.
    pub from_slot: Option<String>,
    pub to_slot: String,
    pub trigger: SwitchTrigger,
    pub reason: String,
    pub duration_ms: f64,
}
