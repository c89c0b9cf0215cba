//! The model registry: named slots, load state, and the single exclusive
//! active-slot reference.
//!
//! The registry itself is a plain data structure; all locking lives in
//! [`HotSwapController`](crate::swap::HotSwapController), which wraps it.

use crate::event::SwitchEvent;
use crate::slot::{ModelSlot, SlotSummary};
use spiellern_core::{GameState, Predictor};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

/// Maximum number of switch events retained in the history.
pub(crate) const SWITCH_HISTORY_CAPACITY: usize = 100;

#[derive(Debug)]
pub(crate) struct Registry {
    slots: HashMap<String, ModelSlot>,
    /// Registration order, for deterministic listing and hotkey cycling.
    order: Vec<String>,
    active: Option<String>,
    history: VecDeque<SwitchEvent>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            slots: HashMap::new(),
            order: Vec::new(),
            active: None,
            history: VecDeque::with_capacity(SWITCH_HISTORY_CAPACITY),
        }
    }

    /// Register a slot. An existing registration under the same name is
    /// replaced, unless it is the active slot.
    pub(crate) fn register(
        &mut self,
        name: &str,
        source_path: PathBuf,
        applicable_states: BTreeSet<GameState>,
        hotkey: Option<String>,
    ) -> bool {
        if self.active.as_deref() == Some(name) {
            tracing::warn!(name, "cannot re-register the active slot");
            return false;
        }
        if self.slots.contains_key(name) {
            tracing::warn!(name, "slot already registered, replacing");
        } else {
            self.order.push(name.to_string());
        }
        self.slots.insert(
            name.to_string(),
            ModelSlot::new(name, source_path, applicable_states, hotkey),
        );
        true
    }

    /// Mark a slot as loaded with its materialized predictor handle.
    pub(crate) fn attach_handle(
        &mut self,
        name: &str,
        handle: Arc<dyn Predictor>,
        load_time_ms: f64,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(name) else {
            return false;
        };
        slot.handle = Some(handle);
        slot.loaded = true;
        slot.load_time_ms = load_time_ms;
        true
    }

    /// Drop a slot's handle, returning it to the registered-only state.
    /// Refuses to unload the active slot.
    pub(crate) fn unload(&mut self, name: &str) -> bool {
        if self.active.as_deref() == Some(name) {
            tracing::warn!(name, "cannot unload the active slot");
            return false;
        }
        match self.slots.get_mut(name) {
            Some(slot) => {
                slot.handle = None;
                slot.loaded = false;
                true
            }
            None => {
                tracing::warn!(name, "unknown slot");
                false
            }
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<&ModelSlot> {
        self.slots.get(name)
    }

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut ModelSlot> {
        self.slots.get_mut(name)
    }

    pub(crate) fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Handle of the active slot, if one is active and loaded.
    pub(crate) fn active_handle(&self) -> Option<Arc<dyn Predictor>> {
        let name = self.active.as_deref()?;
        let slot = self.slots.get(name)?;
        if slot.loaded {
            slot.handle.clone()
        } else {
            None
        }
    }

    /// Flip the active pointer and append the switch event in one step, so
    /// both are observed in the same order by every reader.
    pub(crate) fn activate(&mut self, name: &str, event: SwitchEvent) {
        self.active = Some(name.to_string());
        if self.history.len() == SWITCH_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(event);
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub(crate) fn summaries(&self) -> Vec<SlotSummary> {
        self.order
            .iter()
            .filter_map(|name| self.slots.get(name))
            .map(|slot| SlotSummary {
                name: slot.name.clone(),
                source_path: slot.source_path.display().to_string(),
                loaded: slot.loaded,
                active: self.active.as_deref() == Some(slot.name.as_str()),
                applicable_states: slot.applicable_states.iter().copied().collect(),
                hotkey: slot.hotkey.clone(),
            })
            .collect()
    }

    pub(crate) fn history_tail(&self, n: usize) -> Vec<SwitchEvent> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).cloned().collect()
    }
}
