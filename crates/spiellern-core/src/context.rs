//! Entscheidungskontext und -ergebnis.
//!
//! Der [`DecisionContext`] ist der pro Zyklus von der Wahrnehmungsschicht
//! aufgebaute Schnappschuss der Spielwelt; das [`DecisionResult`] ist der
//! unveränderliche Rückgabewert eines Entscheidungsaufrufs.

use crate::error::CoreError;
use crate::predictor::Frame;
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Herkunft einer Entscheidung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    Rule,
    Model,
    Mixed,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionSource::Rule => write!(f, "rule"),
            DecisionSource::Model => write!(f, "model"),
            DecisionSource::Mixed => write!(f, "mixed"),
        }
    }
}

/// Schnappschuss der beobachteten Spielwelt für einen Entscheidungszyklus.
///
/// Während eines `decide()`-Aufrufs unveränderlich; der Aufrufer baut pro
/// Zyklus einen neuen Kontext auf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContext {
    pub game_state: GameState,
    /// Lebenspunkte als Anteil, garantiert in `0.0..=1.0`.
    pub health_fraction: f64,
    pub nearby_enemy_count: u32,
    /// Rohe Aktionswahrscheinlichkeiten des Modells, falls bereits berechnet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_prediction: Option<Vec<f64>>,
    /// Aktueller Bildschirmausschnitt, falls der Engine eine eigene
    /// Vorhersage über den Hot-Swap-Controller erlaubt werden soll.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Frame>,
}

impl DecisionContext {
    /// Erzeugt einen Kontext; `health_fraction` außerhalb `0.0..=1.0` wird
    /// abgelehnt.
    pub fn new(
        game_state: GameState,
        health_fraction: f64,
        nearby_enemy_count: u32,
    ) -> Result<Self, CoreError> {
        if !(0.0..=1.0).contains(&health_fraction) || !health_fraction.is_finite() {
            return Err(CoreError::InvalidHealthFraction(health_fraction));
        }
        Ok(Self {
            game_state,
            health_fraction,
            nearby_enemy_count,
            model_prediction: None,
            frame: None,
        })
    }

    #[must_use]
    pub fn with_prediction(mut self, prediction: Vec<f64>) -> Self {
        self.model_prediction = Some(prediction);
        self
    }

    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }
}

/// Ergebnis eines Entscheidungsaufrufs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub action_index: usize,
    pub action_name: String,
    pub source: DecisionSource,
    /// Zuversicht in `0.0..=1.0`.
    pub confidence: f64,
    /// Menschenlesbare Begründung, z. B. der Name der ausgelösten Regel.
    pub reason: String,
}
