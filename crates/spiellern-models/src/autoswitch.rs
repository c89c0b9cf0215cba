//! State-triggered automatic model switching.
//!
//! Rules map sets of game states to a target slot. The switcher evaluates
//! them in priority order against the hot-swap controller, gated by a global
//! cooldown plus per-rule cooldowns, and only advances its cooldown clocks
//! when a switch actually succeeds.

use crate::event::SwitchTrigger;
use crate::swap::HotSwapController;
use serde::{Deserialize, Serialize};
use spiellern_core::GameState;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

/// Default seconds between any two automatic switches.
const DEFAULT_GLOBAL_COOLDOWN_SECS: f64 = 5.0;

/// Declarative mapping from game states to a target model slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSwitchRule {
    pub name: String,
    pub trigger_states: BTreeSet<GameState>,
    pub target_slot: String,
    pub priority: i32,
    pub cooldown_secs: f64,
    pub enabled: bool,
}

impl AutoSwitchRule {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        trigger_states: BTreeSet<GameState>,
        target_slot: impl Into<String>,
        priority: i32,
        cooldown_secs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            trigger_states,
            target_slot: target_slot.into(),
            priority,
            cooldown_secs,
            enabled: true,
        }
    }

    #[must_use]
    pub fn matches(&self, state: GameState) -> bool {
        self.enabled && self.trigger_states.contains(&state)
    }
}

pub struct AutoSwitcher {
    controller: Arc<HotSwapController>,
    /// Sorted by priority descending; re-sorted on insert.
    rules: Vec<AutoSwitchRule>,
    global_cooldown_secs: f64,
    last_switch: Option<Instant>,
    rule_last_triggered: HashMap<String, Instant>,
    enabled: bool,
}

impl AutoSwitcher {
    #[must_use]
    pub fn new(controller: Arc<HotSwapController>) -> Self {
        Self {
            controller,
            rules: Vec::new(),
            global_cooldown_secs: DEFAULT_GLOBAL_COOLDOWN_SECS,
            last_switch: None,
            rule_last_triggered: HashMap::new(),
            enabled: true,
        }
    }

    /// Add a rule; an existing rule with the same name is replaced.
    pub fn add_rule(&mut self, rule: AutoSwitchRule) {
        self.rules.retain(|r| r.name != rule.name);
        tracing::debug!(
            rule = %rule.name,
            target = %rule.target_slot,
            priority = rule.priority,
            "auto-switch rule added"
        );
        self.rules.push(rule);
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn remove_rule(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.name != name);
        let removed = self.rules.len() < before;
        if removed {
            self.rule_last_triggered.remove(name);
        } else {
            tracing::warn!(name, "auto-switch rule not found");
        }
        removed
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear();
        self.rule_last_triggered.clear();
    }

    #[must_use]
    pub fn rules(&self) -> &[AutoSwitchRule] {
        &self.rules
    }

    pub fn set_rule_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.name == name) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn set_global_cooldown(&mut self, secs: f64) {
        self.global_cooldown_secs = secs.max(0.0);
    }

    #[must_use]
    pub fn global_cooldown(&self) -> f64 {
        self.global_cooldown_secs
    }

    /// Seconds until the next automatic switch may fire; zero when ready.
    #[must_use]
    pub fn cooldown_remaining(&self) -> f64 {
        match self.last_switch {
            Some(at) => (self.global_cooldown_secs - at.elapsed().as_secs_f64()).max(0.0),
            None => 0.0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        tracing::info!(enabled, "auto-switching toggled");
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Find the slot the current state calls for, without switching.
    ///
    /// Returns `None` while disabled or inside the global cooldown, and
    /// skips rules whose target is already active or whose own cooldown has
    /// not elapsed.
    #[must_use]
    pub fn evaluate(&self, state: GameState) -> Option<String> {
        self.evaluate_at(state, Instant::now())
    }

    fn evaluate_at(&self, state: GameState, now: Instant) -> Option<String> {
        if !self.enabled {
            return None;
        }
        if let Some(at) = self.last_switch {
            if (now - at).as_secs_f64() < self.global_cooldown_secs {
                return None;
            }
        }

        let active = self.controller.active_name();
        for rule in &self.rules {
            if !rule.matches(state) {
                continue;
            }
            if active.as_deref() == Some(rule.target_slot.as_str()) {
                continue;
            }
            if let Some(at) = self.rule_last_triggered.get(&rule.name) {
                if (now - *at).as_secs_f64() < rule.cooldown_secs {
                    continue;
                }
            }
            tracing::debug!(rule = %rule.name, %state, target = %rule.target_slot, "auto-switch rule matched");
            return Some(rule.target_slot.clone());
        }
        None
    }

    /// Evaluate and, when a rule matches, execute the switch. Cooldown
    /// clocks advance only on a successful switch.
    pub fn execute(&mut self, state: GameState) -> bool {
        let now = Instant::now();
        let Some(target) = self.evaluate_at(state, now) else {
            return false;
        };

        let matched_rule = self
            .rules
            .iter()
            .find(|r| r.target_slot == target && r.matches(state))
            .map(|r| r.name.clone());

        let reason = format!("state '{state}' triggered auto switch");
        let switched = self
            .controller
            .switch(&target, SwitchTrigger::Auto, &reason);

        if switched {
            self.last_switch = Some(now);
            if let Some(rule_name) = matched_rule {
                self.rule_last_triggered.insert(rule_name, now);
            }
            tracing::info!(%state, target = %target, "auto switch executed");
        }
        switched
    }
}
