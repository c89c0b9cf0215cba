//! Engine configuration: explicit immutable structs handed to the engine's
//! constructor. The engine keeps its own copy; there is no global state.

use serde::{Deserialize, Serialize};
use spiellern_core::{ActionCatalog, ActionKind, GameState};
use std::collections::HashMap;
use std::fmt;

/// How rule and model results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecisionPolicy {
    #[serde(rename = "rule_first")]
    RuleFirst,
    #[serde(rename = "model_first")]
    ModelFirst,
    #[default]
    #[serde(rename = "weighted_mix")]
    HybridWeighted,
}

impl fmt::Display for DecisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionPolicy::RuleFirst => write!(f, "rule_first"),
            DecisionPolicy::ModelFirst => write!(f, "model_first"),
            DecisionPolicy::HybridWeighted => write!(f, "weighted_mix"),
        }
    }
}

/// Thresholds for the emergency check that runs before any policy.
#[derive(Debug, Clone)]
pub struct EmergencyConfig {
    /// Health fraction below which the emergency action fires.
    pub low_health_threshold: f64,
    /// Enemy count at or above which the emergency action fires.
    pub surround_threshold: u32,
    /// Action executed in an emergency (dodge in the standard catalog).
    pub emergency_action: usize,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            low_health_threshold: 0.3,
            surround_threshold: 3,
            emergency_action: ActionCatalog::DODGE_ACTION,
        }
    }
}

/// Per-(game state, action kind) weights used by the model evaluation.
/// Absent entries weigh 1.0.
#[derive(Debug, Clone, Default)]
pub struct StateWeightTable {
    weights: HashMap<GameState, HashMap<ActionKind, f64>>,
}

impl StateWeightTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A reasonable default table: each state favors the action kinds that
    /// make progress in it.
    #[must_use]
    pub fn standard() -> Self {
        use ActionKind::*;
        let mut table = Self::new();
        for (state, kind, weight) in [
            (GameState::Combat, Skill, 2.0),
            (GameState::Combat, Combo, 1.5),
            (GameState::Combat, Mouse, 1.2),
            (GameState::Combat, Movement, 0.8),
            (GameState::Moving, Movement, 2.0),
            (GameState::Moving, Skill, 0.3),
            (GameState::Moving, Combo, 0.2),
            (GameState::Looting, Special, 2.0),
            (GameState::Looting, Movement, 1.2),
            (GameState::Looting, Skill, 0.2),
            (GameState::Gathering, Special, 2.0),
            (GameState::Gathering, Skill, 0.2),
            (GameState::Dialogue, Special, 1.5),
            (GameState::Dialogue, Mouse, 1.5),
            (GameState::Dialogue, Movement, 0.3),
            (GameState::Dialogue, Skill, 0.1),
            (GameState::Menu, Mouse, 2.0),
            (GameState::Menu, Movement, 0.2),
            (GameState::Menu, Skill, 0.1),
            (GameState::Dead, Movement, 0.3),
            (GameState::Dead, Skill, 0.1),
            (GameState::Loading, Movement, 0.2),
            (GameState::Loading, Skill, 0.1),
            (GameState::Idle, Movement, 1.5),
        ] {
            table.set(state, kind, weight);
        }
        table
    }

    pub fn set(&mut self, state: GameState, kind: ActionKind, weight: f64) {
        self.weights.entry(state).or_default().insert(kind, weight);
    }

    /// Weight for an action kind in a state; 1.0 when unconfigured or when
    /// the action's kind is unknown.
    #[must_use]
    pub fn weight(&self, state: GameState, kind: Option<ActionKind>) -> f64 {
        let Some(kind) = kind else {
            return 1.0;
        };
        self.weights
            .get(&state)
            .and_then(|kinds| kinds.get(&kind))
            .copied()
            .unwrap_or(1.0)
    }
}

/// Full decision-engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub policy: DecisionPolicy,
    /// Weight of rule-derived scores in hybrid blending.
    pub rule_weight: f64,
    /// Weight of model-derived scores in hybrid blending.
    pub model_weight: f64,
    /// Capacity of the bounded decision log.
    pub log_capacity: usize,
    pub logging_enabled: bool,
    /// Action returned when every action is cooldown-blocked.
    pub noop_action: usize,
    /// Seconds of cooldown per action index; absent or non-positive entries
    /// mean the action is always eligible.
    pub action_cooldowns: HashMap<usize, f64>,
    pub emergency: EmergencyConfig,
    pub state_weights: StateWeightTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: DecisionPolicy::default(),
            rule_weight: 0.6,
            model_weight: 0.4,
            log_capacity: 100,
            logging_enabled: true,
            noop_action: ActionCatalog::NOOP_ACTION,
            action_cooldowns: HashMap::new(),
            emergency: EmergencyConfig::default(),
            state_weights: StateWeightTable::standard(),
        }
    }
}
