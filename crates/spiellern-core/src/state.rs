//! Spielzustände, wie sie von der externen Wahrnehmungsschicht geliefert
//! werden.
//!
//! Die Zustandserkennung selbst (Pixel → Zustand) liegt außerhalb dieses
//! Kerns; hier wird nur das standardisierte Austauschformat definiert, auf
//! das sich Entscheidungs-Engine, Auto-Umschalter und Gewichtstabellen
//! beziehen.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diskreter Spielzustand eines Entscheidungszyklus.
///
/// Die Wire-Repräsentation ist der englische Kleinbuchstaben-Name
/// (`"combat"`, `"dialogue"`, …), damit Konfigurationsdateien und Logs
/// sprachneutral bleiben.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Combat,
    Dialogue,
    Menu,
    Moving,
    Looting,
    Gathering,
    Dead,
    Loading,
    Idle,
    Unknown,
}

impl GameState {
    /// Alle Zustände in stabiler Reihenfolge, z. B. für Gewichtstabellen.
    pub const ALL: [GameState; 10] = [
        GameState::Combat,
        GameState::Dialogue,
        GameState::Menu,
        GameState::Moving,
        GameState::Looting,
        GameState::Gathering,
        GameState::Dead,
        GameState::Loading,
        GameState::Idle,
        GameState::Unknown,
    ];

    /// Wire-Name des Zustands.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Combat => "combat",
            GameState::Dialogue => "dialogue",
            GameState::Menu => "menu",
            GameState::Moving => "moving",
            GameState::Looting => "looting",
            GameState::Gathering => "gathering",
            GameState::Dead => "dead",
            GameState::Loading => "loading",
            GameState::Idle => "idle",
            GameState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
