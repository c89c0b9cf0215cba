//! Model management for spiellern: registry, hot-swapping, state-triggered
//! auto-switching and hotkey routing.
//!
//! The one piece of state that demands exclusive-writer discipline is the
//! active-model reference inside [`HotSwapController`]; everything else
//! follows the usual single-owner pattern.

pub mod autoswitch;
pub mod error;
pub mod event;
pub mod hotkey;
mod registry;
pub mod slot;
pub mod swap;

pub use autoswitch::{AutoSwitchRule, AutoSwitcher};
pub use error::SwapError;
pub use event::{SwitchEvent, SwitchTrigger};
pub use hotkey::HotkeyRouter;
pub use slot::{ModelSlot, SlotSummary};
pub use swap::HotSwapController;
