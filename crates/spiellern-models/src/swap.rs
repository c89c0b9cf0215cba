//! Hot-swap controller: thread-safe switching of the active model while
//! predictions are in flight.
//!
//! Two locks with distinct jobs:
//!
//! - a switch [`Mutex`] that totally orders switch/load operations and is
//!   held across the (potentially slow) loader call, and
//! - a registry [`RwLock`] guarding the active pointer, slot table and
//!   switch history. Writers hold it only for the pointer flip; `predict`
//!   holds it in read mode just long enough to snapshot the active handle.
//!
//! A `predict` call therefore executes against exactly one fully-loaded
//! model that was active at some instant during the call, never a mix of
//! pre- and post-switch state.

use crate::error::{Result, SwapError};
use crate::event::{SwitchEvent, SwitchTrigger};
use crate::registry::Registry;
use crate::slot::SlotSummary;
use parking_lot::{Mutex, RwLock};
use spiellern_core::{Frame, GameState, Predictor, PredictorLoader};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;

pub struct HotSwapController {
    registry: RwLock<Registry>,
    switch_lock: Mutex<()>,
    loader: Arc<dyn PredictorLoader>,
}

impl HotSwapController {
    #[must_use]
    pub fn new(loader: Arc<dyn PredictorLoader>) -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
            switch_lock: Mutex::new(()),
            loader,
        }
    }

    /// Register a model artifact under a unique name. Does not load it.
    pub fn register(
        &self,
        name: &str,
        source_path: impl Into<PathBuf>,
        applicable_states: BTreeSet<GameState>,
        hotkey: Option<String>,
    ) -> bool {
        let registered =
            self.registry
                .write()
                .register(name, source_path.into(), applicable_states, hotkey);
        if registered {
            tracing::debug!(name, "slot registered");
        }
        registered
    }

    /// Load a registered slot's artifact into memory. Idempotent for already
    /// loaded slots; returns `false` for unknown slots or loader failures.
    pub fn load(&self, name: &str) -> bool {
        let _guard = self.switch_lock.lock();
        self.load_locked(name)
    }

    /// Loader invocation shared by `load` and `switch`. Caller must hold the
    /// switch lock; the registry lock is only taken briefly before and after
    /// the loader call.
    fn load_locked(&self, name: &str) -> bool {
        let source_path = {
            let registry = self.registry.read();
            match registry.slot(name) {
                Some(slot) if slot.loaded => return true,
                Some(slot) => slot.source_path.clone(),
                None => {
                    tracing::warn!(name, "cannot load unknown slot");
                    return false;
                }
            }
        };

        let started = Instant::now();
        match self.loader.load(&source_path) {
            Ok(handle) => {
                let load_time_ms = started.elapsed().as_secs_f64() * 1000.0;
                let attached = self.registry.write().attach_handle(name, handle, load_time_ms);
                if attached {
                    tracing::info!(name, load_time_ms, "model loaded");
                }
                attached
            }
            Err(error) => {
                tracing::error!(name, %error, "model load failed");
                false
            }
        }
    }

    /// Unload a slot, releasing its predictor handle. Fails (returns `false`)
    /// for unknown slots and for the active slot.
    pub fn unload(&self, name: &str) -> bool {
        let _guard = self.switch_lock.lock();
        let unloaded = self.registry.write().unload(name);
        if unloaded {
            tracing::info!(name, "model unloaded");
        }
        unloaded
    }

    /// Switch the active model. Returns `true` if `name` is already active
    /// (no-op); otherwise loads the target if necessary, atomically updates
    /// the active pointer, and records a [`SwitchEvent`]. Unknown or
    /// unloadable targets leave all state unchanged and return `false`.
    pub fn switch(&self, name: &str, trigger: SwitchTrigger, reason: &str) -> bool {
        let started = Instant::now();
        let _guard = self.switch_lock.lock();

        {
            let registry = self.registry.read();
            if registry.slot(name).is_none() {
                tracing::warn!(name, "switch target does not exist");
                return false;
            }
            if registry.active_name() == Some(name) {
                tracing::debug!(name, "switch target already active");
                return true;
            }
        }

        if !self.load_locked(name) {
            return false;
        }

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        let mut registry = self.registry.write();
        let from_slot = registry.active_name().map(str::to_string);
        let event = SwitchEvent {
            timestamp: OffsetDateTime::now_utc(),
            from_slot: from_slot.clone(),
            to_slot: name.to_string(),
            trigger,
            reason: if reason.is_empty() {
                format!("switch to {name}")
            } else {
                reason.to_string()
            },
            duration_ms,
        };
        registry.activate(name, event);
        if let Some(slot) = registry.slot_mut(name) {
            slot.last_used = Some(OffsetDateTime::now_utc());
        }
        drop(registry);

        tracing::info!(
            from = from_slot.as_deref().unwrap_or("<none>"),
            to = name,
            %trigger,
            duration_ms,
            "model switched"
        );
        true
    }

    /// Run a prediction against the currently active model.
    ///
    /// The active handle is snapshotted under a read lock and invoked after
    /// the lock is released, so the call is served entirely by one model
    /// version even if a switch lands concurrently.
    pub fn predict(&self, frame: &Frame) -> Result<Vec<f64>> {
        let handle = {
            let registry = self.registry.read();
            registry.active_handle().ok_or(SwapError::NoActiveModel)?
        };
        handle.predict(frame).map_err(SwapError::from)
    }

    #[must_use]
    pub fn active_name(&self) -> Option<String> {
        self.registry.read().active_name().map(str::to_string)
    }

    /// Names of all registered slots in registration order.
    #[must_use]
    pub fn slot_names(&self) -> Vec<String> {
        self.registry.read().names()
    }

    #[must_use]
    pub fn list_slots(&self) -> Vec<SlotSummary> {
        self.registry.read().summaries()
    }

    /// The most recent `n` switch events, oldest first.
    #[must_use]
    pub fn switch_history(&self, n: usize) -> Vec<SwitchEvent> {
        self.registry.read().history_tail(n)
    }
}

impl std::fmt::Debug for HotSwapController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("HotSwapController")
            .field("slots", &registry.names())
            .field("active", &registry.active_name())
            .finish_non_exhaustive()
    }
}
