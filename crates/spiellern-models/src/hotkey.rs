//! Hotkey routing: external key identifiers mapped to switch commands.
//!
//! Key capture itself lives outside this core; callers feed already-decoded
//! key names into [`HotkeyRouter::handle_key`]. Keys are matched
//! case-insensitively (normalized to uppercase). A dedicated cycle key
//! advances round-robin through the registered slots.

use crate::event::SwitchTrigger;
use crate::swap::HotSwapController;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct HotkeyRouter {
    controller: Arc<HotSwapController>,
    /// key → slot. BTreeMap keeps listings deterministic.
    bindings: BTreeMap<String, String>,
    /// slot → key, for evicting stale pairs on re-binding.
    slot_keys: BTreeMap<String, String>,
    cycle_key: Option<String>,
    enabled: bool,
}

fn normalize(key: &str) -> String {
    key.trim().to_uppercase()
}

impl HotkeyRouter {
    #[must_use]
    pub fn new(controller: Arc<HotSwapController>) -> Self {
        Self {
            controller,
            bindings: BTreeMap::new(),
            slot_keys: BTreeMap::new(),
            cycle_key: None,
            enabled: true,
        }
    }

    /// Bind a key to a slot. Re-binding either side evicts the previous
    /// pairing. Unregistered slot names are allowed (pre-registration).
    pub fn register(&mut self, key: &str, slot_name: &str) -> bool {
        let key = normalize(key);
        if key.is_empty() {
            return false;
        }

        if !self.controller.slot_names().iter().any(|n| n == slot_name) {
            tracing::warn!(slot = slot_name, %key, "hotkey bound to a slot that is not registered yet");
        }

        if let Some(old_slot) = self.bindings.get(&key) {
            tracing::warn!(%key, old = %old_slot, new = slot_name, "hotkey re-bound");
            self.slot_keys.remove(old_slot);
        }
        if let Some(old_key) = self.slot_keys.get(slot_name) {
            self.bindings.remove(old_key);
        }

        self.bindings.insert(key.clone(), slot_name.to_string());
        self.slot_keys.insert(slot_name.to_string(), key.clone());
        tracing::debug!(%key, slot = slot_name, "hotkey registered");
        true
    }

    pub fn unregister(&mut self, key: &str) -> bool {
        let key = normalize(key);
        match self.bindings.remove(&key) {
            Some(slot) => {
                self.slot_keys.remove(&slot);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
        self.slot_keys.clear();
    }

    #[must_use]
    pub fn bindings(&self) -> &BTreeMap<String, String> {
        &self.bindings
    }

    pub fn set_cycle_key(&mut self, key: &str) {
        self.cycle_key = Some(normalize(key));
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Handle one key press. Exact bindings win over the cycle key. Returns
    /// whether a model switch was triggered.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let key = normalize(key);

        if let Some(slot) = self.bindings.get(&key).cloned() {
            let reason = format!("hotkey {key}");
            let switched = self
                .controller
                .switch(&slot, SwitchTrigger::Hotkey, &reason);
            if switched {
                tracing::info!(%key, slot = %slot, "hotkey switch");
            }
            return switched;
        }

        if self.cycle_key.as_deref() == Some(key.as_str()) {
            return self.cycle().is_some();
        }

        false
    }

    /// Switch to the next registered slot in round-robin order, wrapping.
    /// Returns the name of the newly active slot on success.
    pub fn cycle(&mut self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let slots = self.controller.slot_names();
        if slots.is_empty() {
            tracing::warn!("no slots available for cycle switching");
            return None;
        }

        let active = self.controller.active_name();
        let current = active
            .as_deref()
            .and_then(|name| slots.iter().position(|s| s == name));
        let next = match current {
            Some(index) => (index + 1) % slots.len(),
            None => 0,
        };
        let target = slots[next].clone();

        let reason = format!("cycle switch ({}/{})", next + 1, slots.len());
        if self
            .controller
            .switch(&target, SwitchTrigger::Hotkey, &reason)
        {
            tracing::info!(slot = %target, "cycle switch");
            Some(target)
        } else {
            None
        }
    }
}
