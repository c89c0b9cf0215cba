//! Regel- und Modell-Entscheidungs-Engine für spiellern.
//!
//! Kombiniert priorisierte Regeln, eine Zustands-Gewichtstabelle und die
//! rohe Modellvorhersage zu genau einer Aktion pro Aufruf. Optional werden
//! ein Hot-Swap-Controller (Vorhersagen) und ein Auto-Tuner
//! (Selbstoptimierung) bei der Konstruktion angeschlossen.

pub mod config;
pub mod engine;
pub mod feedback;
pub mod rule;

pub use config::{DecisionPolicy, EmergencyConfig, EngineConfig, StateWeightTable};
pub use engine::{DecisionEngine, DecisionLogEntry, DecisionStats};
pub use feedback::TunerStatus;
pub use rule::{DecisionRule, RulePredicate};
