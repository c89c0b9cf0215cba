//! Bounded, steppable tuning knobs.

use crate::error::{Result, TuningError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One tunable numeric setting with hard bounds and a step size.
///
/// Invariant: `min_value <= current_value <= max_value` holds at all times;
/// every mutation clamps into the range. A locked parameter ignores all
/// mutation except explicit re-creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpace {
    name: String,
    min_value: f64,
    max_value: f64,
    step: f64,
    current_value: f64,
    default_value: f64,
    #[serde(default)]
    locked: bool,
}

impl ParameterSpace {
    pub fn new(
        name: impl Into<String>,
        min_value: f64,
        max_value: f64,
        step: f64,
        current_value: f64,
        default_value: f64,
    ) -> Result<Self> {
        let space = Self {
            name: name.into(),
            min_value,
            max_value,
            step,
            current_value,
            default_value,
            locked: false,
        };
        space.validate()?;
        Ok(space)
    }

    /// Consistency check shared by the constructor and the persistence
    /// loader.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TuningError::InvalidParameter(
                "parameter name must not be empty".to_string(),
            ));
        }
        if self.min_value > self.max_value {
            return Err(TuningError::InvalidParameter(format!(
                "min {} exceeds max {} for '{}'",
                self.min_value, self.max_value, self.name
            )));
        }
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(TuningError::InvalidParameter(format!(
                "step must be positive for '{}', got {}",
                self.name, self.step
            )));
        }
        for (label, value) in [
            ("current value", self.current_value),
            ("default value", self.default_value),
        ] {
            if !(self.min_value..=self.max_value).contains(&value) {
                return Err(TuningError::InvalidParameter(format!(
                    "{label} {value} outside [{}, {}] for '{}'",
                    self.min_value, self.max_value, self.name
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    #[must_use]
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Apply a delta, clamped into `[min, max]`. Returns the value after the
    /// adjustment; a locked parameter is left untouched.
    pub fn adjust(&mut self, delta: f64) -> f64 {
        if self.locked {
            return self.current_value;
        }
        self.current_value = (self.current_value + delta).clamp(self.min_value, self.max_value);
        self.current_value
    }

    /// Overwrite the current value, clamped into range. No-op when locked.
    pub(crate) fn set_current_clamped(&mut self, value: f64) {
        if self.locked {
            return;
        }
        self.current_value = value.clamp(self.min_value, self.max_value);
    }

    /// Restore the default value. No-op when locked.
    pub fn reset(&mut self) {
        if !self.locked {
            self.current_value = self.default_value;
        }
    }

    /// Signed distance of the current value from the default.
    #[must_use]
    pub fn diff(&self) -> f64 {
        self.current_value - self.default_value
    }
}

/// The standard set of knobs the auto-tuner explores.
#[must_use]
#[allow(clippy::missing_panics_doc)]
pub fn default_parameter_spaces() -> BTreeMap<String, ParameterSpace> {
    #[allow(clippy::unwrap_used)]
    let spaces = [
        ParameterSpace::new("action_cooldown", 0.1, 2.0, 0.1, 0.5, 0.5).unwrap(),
        ParameterSpace::new("state_switch_threshold", 0.3, 0.9, 0.05, 0.6, 0.6).unwrap(),
        ParameterSpace::new("rule_priority_weight", 0.0, 1.0, 0.1, 0.7, 0.7).unwrap(),
        ParameterSpace::new("detection_confidence_threshold", 0.3, 0.9, 0.05, 0.5, 0.5).unwrap(),
    ];
    spaces
        .into_iter()
        .map(|space| (space.name().to_string(), space))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn knob() -> ParameterSpace {
        ParameterSpace::new("knob", 0.0, 1.0, 0.1, 0.5, 0.5).unwrap()
    }

    #[test]
    fn construction_validates_bounds() {
        assert!(ParameterSpace::new("", 0.0, 1.0, 0.1, 0.5, 0.5).is_err());
        assert!(ParameterSpace::new("x", 1.0, 0.0, 0.1, 0.5, 0.5).is_err());
        assert!(ParameterSpace::new("x", 0.0, 1.0, 0.0, 0.5, 0.5).is_err());
        assert!(ParameterSpace::new("x", 0.0, 1.0, 0.1, 1.5, 0.5).is_err());
        assert!(ParameterSpace::new("x", 0.0, 1.0, 0.1, 0.5, -0.5).is_err());
    }

    #[test]
    fn adjust_clamps_into_range_for_any_delta() {
        let mut space = knob();
        assert!((space.adjust(0.2) - 0.7).abs() < 1e-9);
        assert!((space.adjust(1e9) - 1.0).abs() < 1e-9, "clamped to max");
        assert!((space.adjust(-1e12) - 0.0).abs() < 1e-9, "clamped to min");
    }

    #[test]
    fn locked_parameter_ignores_mutation() {
        let mut space = knob();
        space.set_locked(true);
        assert!((space.adjust(0.3) - 0.5).abs() < 1e-9);
        space.set_current_clamped(0.9);
        space.reset();
        assert!((space.current_value() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn diff_is_signed_distance_from_default() {
        let mut space = knob();
        space.adjust(0.2);
        assert!((space.diff() - 0.2).abs() < 1e-9);
        space.adjust(-0.4);
        assert!((space.diff() + 0.2).abs() < 1e-9);
    }

    #[test]
    fn default_spaces_cover_the_standard_knobs() {
        let spaces = default_parameter_spaces();
        assert_eq!(spaces.len(), 4);
        let cooldown = &spaces["action_cooldown"];
        assert!((cooldown.min_value() - 0.1).abs() < 1e-9);
        assert!((cooldown.max_value() - 2.0).abs() < 1e-9);
        assert!((cooldown.default_value() - 0.5).abs() < 1e-9);
        assert!(!cooldown.is_locked());
    }
}
