//! Closed-loop auto-tuner.
//!
//! The tuner owns the parameter map, the metric store and the tuning audit
//! trail. Each cycle adjusts one parameter by a bounded step, remembers the
//! performance at adjustment time, and a later evaluation pass either keeps
//! the change or rolls it back when the overall score regressed.

use crate::error::{Result, TuningError};
use crate::metric::{MetricStore, PerformanceMetric};
use crate::parameter::{default_parameter_spaces, ParameterSpace};
use crate::record::TuningRecord;
use crate::store::TuningStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// Minimum number of collected metrics before tuning may run.
const MIN_METRICS_FOR_TUNING: usize = 5;
/// Aggregation window used for before/after comparisons, in minutes.
const TUNING_WINDOW_MINUTES: u32 = 5;

/// How large a single automatic adjustment may be, in step multiples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggressiveness {
    /// One step per adjustment.
    Conservative,
    /// Two steps per adjustment.
    #[default]
    Balanced,
    /// Three steps per adjustment.
    Aggressive,
}

impl Aggressiveness {
    #[must_use]
    pub fn step_multiplier(&self) -> u32 {
        match self {
            Aggressiveness::Conservative => 1,
            Aggressiveness::Balanced => 2,
            Aggressiveness::Aggressive => 3,
        }
    }

    /// Parse a level name case-insensitively, falling back to
    /// `Conservative` for unrecognised strings rather than erroring.
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "conservative" => Aggressiveness::Conservative,
            "balanced" => Aggressiveness::Balanced,
            "aggressive" => Aggressiveness::Aggressive,
            _ => {
                tracing::warn!(value, "unknown aggressiveness level, defaulting to conservative");
                Aggressiveness::Conservative
            }
        }
    }
}

impl fmt::Display for Aggressiveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggressiveness::Conservative => write!(f, "conservative"),
            Aggressiveness::Balanced => write!(f, "balanced"),
            Aggressiveness::Aggressive => write!(f, "aggressive"),
        }
    }
}

pub struct AutoTuner {
    enabled: bool,
    aggressiveness: Aggressiveness,
    parameters: BTreeMap<String, ParameterSpace>,
    metrics: MetricStore,
    records: Vec<TuningRecord>,
    store: Option<TuningStore>,
}

impl AutoTuner {
    /// In-memory tuner seeded with the standard parameter spaces.
    #[must_use]
    pub fn new(enabled: bool, aggressiveness: Aggressiveness) -> Self {
        Self {
            enabled,
            aggressiveness,
            parameters: default_parameter_spaces(),
            metrics: MetricStore::new(),
            records: Vec::new(),
            store: None,
        }
    }

    /// Tuner backed by a persistence directory. Previously persisted
    /// metrics, records and parameter overrides are loaded; every mutation
    /// is written back synchronously.
    #[must_use]
    pub fn with_store(enabled: bool, aggressiveness: Aggressiveness, store: TuningStore) -> Self {
        let mut tuner = Self::new(enabled, aggressiveness);
        tuner.metrics.replace(store.load_metrics());
        tuner.records = store.load_records();
        for (name, space) in store.load_parameters() {
            tuner.parameters.insert(name, space);
        }
        tuner.store = Some(store);
        tuner
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        tracing::info!(enabled, "auto-tuning toggled");
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn aggressiveness(&self) -> Aggressiveness {
        self.aggressiveness
    }

    pub fn set_aggressiveness(&mut self, aggressiveness: Aggressiveness) {
        self.aggressiveness = aggressiveness;
    }

    // ----------------------------------------------------------------
    // Metric collection
    // ----------------------------------------------------------------

    /// Append a metric and persist the store.
    pub fn collect_metric(&mut self, metric: PerformanceMetric) {
        self.metrics.push(metric);
        self.persist_metrics();
    }

    #[must_use]
    pub fn metrics(&self) -> &[PerformanceMetric] {
        self.metrics.all()
    }

    #[must_use]
    pub fn metrics_count(&self) -> usize {
        self.metrics.len()
    }

    pub fn clear_metrics(&mut self) {
        self.metrics.clear();
        self.persist_metrics();
    }

    /// Aggregated metric over the trailing window (means for the rates, sum
    /// for the stuck count).
    #[must_use]
    pub fn aggregated(&self, window_minutes: u32) -> PerformanceMetric {
        self.metrics.aggregated(window_minutes)
    }

    // ----------------------------------------------------------------
    // Records
    // ----------------------------------------------------------------

    #[must_use]
    pub fn records(&self) -> &[TuningRecord] {
        &self.records
    }

    #[must_use]
    pub fn records_for(&self, parameter_name: &str) -> Vec<&TuningRecord> {
        self.records
            .iter()
            .filter(|r| r.parameter_name == parameter_name)
            .collect()
    }

    // ----------------------------------------------------------------
    // Parameter management
    // ----------------------------------------------------------------

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpace> {
        self.parameters.get(name)
    }

    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<String, ParameterSpace> {
        &self.parameters
    }

    /// Explicitly create or replace a parameter definition. This is the one
    /// mutation a locked parameter does not block.
    pub fn add_parameter(&mut self, space: ParameterSpace) {
        self.parameters.insert(space.name().to_string(), space);
        self.persist_parameters();
    }

    /// Overwrite a parameter's current value, clamped into range. Soft
    /// failure: `false` for unknown or locked parameters.
    pub fn set_parameter_value(&mut self, name: &str, value: f64) -> bool {
        let Some(space) = self.parameters.get_mut(name) else {
            return false;
        };
        if space.is_locked() {
            return false;
        }
        space.set_current_clamped(value);
        self.persist_parameters();
        true
    }

    /// Lock a parameter against tuning. Unknown names are a hard error:
    /// locking is an explicit operator action.
    pub fn lock_parameter(&mut self, name: &str) -> Result<()> {
        let space = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| TuningError::UnknownParameter(name.to_string()))?;
        space.set_locked(true);
        self.persist_parameters();
        tracing::info!(name, "parameter locked");
        Ok(())
    }

    pub fn unlock_parameter(&mut self, name: &str) -> Result<()> {
        let space = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| TuningError::UnknownParameter(name.to_string()))?;
        space.set_locked(false);
        self.persist_parameters();
        tracing::info!(name, "parameter unlocked");
        Ok(())
    }

    pub fn is_parameter_locked(&self, name: &str) -> Result<bool> {
        self.parameters
            .get(name)
            .map(ParameterSpace::is_locked)
            .ok_or_else(|| TuningError::UnknownParameter(name.to_string()))
    }

    #[must_use]
    pub fn locked_parameters(&self) -> Vec<String> {
        self.parameters
            .values()
            .filter(|p| p.is_locked())
            .map(|p| p.name().to_string())
            .collect()
    }

    #[must_use]
    pub fn unlocked_parameters(&self) -> Vec<String> {
        self.parameters
            .values()
            .filter(|p| !p.is_locked())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Restore every unlocked parameter to its default value.
    pub fn reset_to_defaults(&mut self) {
        let mut reset = 0usize;
        let mut skipped = 0usize;
        for space in self.parameters.values_mut() {
            if space.is_locked() {
                skipped += 1;
            } else {
                space.reset();
                reset += 1;
            }
        }
        self.persist_parameters();
        tracing::info!(reset, skipped, "parameters reset to defaults");
    }

    /// Restore a single parameter to its default. `false` when locked, a
    /// hard error when unknown.
    pub fn reset_parameter_to_default(&mut self, name: &str) -> Result<bool> {
        let space = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| TuningError::UnknownParameter(name.to_string()))?;
        if space.is_locked() {
            tracing::warn!(name, "locked parameter not reset");
            return Ok(false);
        }
        space.reset();
        self.persist_parameters();
        Ok(true)
    }

    /// Parameters whose current value differs from the default (exact
    /// comparison), as `(current, default)` pairs.
    #[must_use]
    pub fn parameter_diff(&self) -> BTreeMap<String, (f64, f64)> {
        self.parameters
            .iter()
            .filter(|(_, p)| p.current_value() != p.default_value())
            .map(|(name, p)| (name.clone(), (p.current_value(), p.default_value())))
            .collect()
    }

    /// Every parameter as `(current, default, current − default)`.
    #[must_use]
    pub fn all_parameter_diff(&self) -> BTreeMap<String, (f64, f64, f64)> {
        self.parameters
            .iter()
            .map(|(name, p)| {
                (
                    name.clone(),
                    (p.current_value(), p.default_value(), p.diff()),
                )
            })
            .collect()
    }

    // ----------------------------------------------------------------
    // Tuning core
    // ----------------------------------------------------------------

    /// Whether a tuning cycle is warranted: tuning enabled and enough
    /// metrics collected to make the comparison meaningful.
    #[must_use]
    pub fn should_tune(&self) -> bool {
        self.enabled && self.metrics.len() >= MIN_METRICS_FOR_TUNING
    }

    /// Whether `current` scores strictly below `baseline`.
    #[must_use]
    pub fn is_performance_degraded(
        current: &PerformanceMetric,
        baseline: &PerformanceMetric,
    ) -> bool {
        current.overall_score() < baseline.overall_score()
    }

    /// Direction for the next adjustment of `name`: keep the direction of
    /// the last improving adjustment, flip after a regression, and default
    /// upward with no (or inconclusive) history.
    fn determine_direction(&self, name: &str) -> f64 {
        let records = self.records_for(name);
        let Some(last) = records.last() else {
            return 1.0;
        };
        let last_direction = if last.new_value > last.old_value {
            1.0
        } else {
            -1.0
        };
        match last.is_improvement() {
            Some(true) => last_direction,
            Some(false) => -last_direction,
            None => 1.0,
        }
    }

    /// Adjust one parameter by `direction × step × multiplier`, clamped into
    /// its range. When the clamp leaves the value unchanged (already at a
    /// boundary), the opposite direction is tried once. Appends and persists
    /// a [`TuningRecord`] whose `performance_after` is filled in later by
    /// [`evaluate_and_rollback_if_needed`](Self::evaluate_and_rollback_if_needed).
    pub fn tune_parameter(&mut self, name: &str) -> Result<TuningRecord> {
        let space = self
            .parameters
            .get(name)
            .ok_or_else(|| TuningError::UnknownParameter(name.to_string()))?;
        if space.is_locked() {
            return Err(TuningError::LockedParameter(name.to_string()));
        }

        let performance_before = self.aggregated(TUNING_WINDOW_MINUTES);
        let direction = self.determine_direction(name);
        let multiplier = f64::from(self.aggressiveness.step_multiplier());

        // Borrow checked above; the map cannot have changed since.
        let Some(space) = self.parameters.get_mut(name) else {
            return Err(TuningError::UnknownParameter(name.to_string()));
        };
        let old_value = space.current_value();
        let delta = direction * space.step() * multiplier;
        let mut new_value = space.adjust(delta);
        if new_value == old_value {
            // Already at a boundary; probe the other way instead.
            new_value = space.adjust(-delta);
        }
        self.persist_parameters();

        let reason = format!(
            "auto tuning ({} mode): {} by {:.4}",
            self.aggressiveness,
            if new_value >= old_value {
                "increased"
            } else {
                "decreased"
            },
            (new_value - old_value).abs()
        );
        let record = TuningRecord {
            timestamp: OffsetDateTime::now_utc(),
            parameter_name: name.to_string(),
            old_value,
            new_value,
            reason,
            performance_before: Some(performance_before),
            performance_after: None,
        };
        self.records.push(record.clone());
        self.persist_records();

        tracing::info!(
            name,
            old_value,
            new_value,
            reason = %record.reason,
            "parameter tuned"
        );
        Ok(record)
    }

    /// Revert a recorded adjustment. `false` for unknown or locked
    /// parameters.
    pub fn rollback(&mut self, record: &TuningRecord) -> bool {
        let Some(space) = self.parameters.get_mut(&record.parameter_name) else {
            tracing::error!(name = %record.parameter_name, "rollback failed: unknown parameter");
            return false;
        };
        if space.is_locked() {
            tracing::warn!(name = %record.parameter_name, "rollback failed: parameter locked");
            return false;
        }
        space.set_current_clamped(record.old_value);
        self.persist_parameters();
        tracing::info!(
            name = %record.parameter_name,
            from = record.new_value,
            to = record.old_value,
            "parameter rolled back"
        );
        true
    }

    /// Measure the post-adjustment performance, store it into the record
    /// (both the caller's copy and the persisted trail), and roll back when
    /// the overall score regressed. Returns `true` when the adjustment is
    /// kept.
    pub fn evaluate_and_rollback_if_needed(&mut self, record: &mut TuningRecord) -> bool {
        let Some(before) = record.performance_before.clone() else {
            tracing::warn!("cannot evaluate adjustment: no baseline performance recorded");
            return true;
        };

        let after = self.aggregated(TUNING_WINDOW_MINUTES);
        record.performance_after = Some(after.clone());
        if let Some(stored) = self.records.iter_mut().find(|r| {
            r.parameter_name == record.parameter_name && r.timestamp == record.timestamp
        }) {
            stored.performance_after = Some(after.clone());
        }
        self.persist_records();

        if Self::is_performance_degraded(&after, &before) {
            tracing::info!(name = %record.parameter_name, "performance degraded, rolling back");
            self.rollback(record);
            false
        } else {
            tracing::info!(name = %record.parameter_name, "adjustment kept");
            true
        }
    }

    /// One convenience tuning cycle: when warranted, tune the unlocked
    /// parameter with the fewest historical records (round-robin
    /// exploration; ties resolve to the lexicographically first name).
    pub fn auto_tune_cycle(&mut self) -> Option<TuningRecord> {
        if !self.should_tune() {
            return None;
        }

        let candidate = self
            .parameters
            .values()
            .filter(|p| !p.is_locked())
            .map(|p| (p.name().to_string(), self.records_for(p.name()).len()))
            .min_by_key(|(_, count)| *count)
            .map(|(name, _)| name);

        let Some(name) = candidate else {
            tracing::info!("all parameters locked, skipping auto-tune cycle");
            return None;
        };

        match self.tune_parameter(&name) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::error!(%error, "auto-tune cycle failed");
                None
            }
        }
    }

    // ----------------------------------------------------------------
    // Persistence plumbing
    // ----------------------------------------------------------------

    fn persist_metrics(&self) {
        if let Some(store) = &self.store {
            if let Err(error) = store.save_metrics(self.metrics.all()) {
                tracing::warn!(%error, "failed to persist metrics");
            }
        }
    }

    fn persist_records(&self) {
        if let Some(store) = &self.store {
            if let Err(error) = store.save_records(&self.records) {
                tracing::warn!(%error, "failed to persist tuning records");
            }
        }
    }

    fn persist_parameters(&self) {
        if let Some(store) = &self.store {
            if let Err(error) = store.save_parameters(&self.parameters) {
                tracing::warn!(%error, "failed to persist parameters");
            }
        }
    }
}

impl fmt::Debug for AutoTuner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoTuner")
            .field("enabled", &self.enabled)
            .field("aggressiveness", &self.aggressiveness)
            .field("parameters", &self.parameters.len())
            .field("metrics", &self.metrics.len())
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn metric(success: f64) -> PerformanceMetric {
        PerformanceMetric::new(success, 0.5, 0, 0.5).expect("valid metric")
    }

    fn tuner_with_metrics(count: usize, success: f64) -> AutoTuner {
        let mut tuner = AutoTuner::new(true, Aggressiveness::Balanced);
        for _ in 0..count {
            tuner.collect_metric(metric(success));
        }
        tuner
    }

    // ----------------------------------------------------------------
    // Gating
    // ----------------------------------------------------------------

    #[test]
    fn should_tune_requires_enabled_and_five_metrics() {
        let mut tuner = tuner_with_metrics(4, 0.5);
        assert!(!tuner.should_tune(), "four metrics are not enough");

        tuner.collect_metric(metric(0.5));
        assert!(tuner.should_tune());

        tuner.set_enabled(false);
        assert!(!tuner.should_tune());
    }

    // ----------------------------------------------------------------
    // tune_parameter
    // ----------------------------------------------------------------

    #[test]
    fn tune_unknown_parameter_is_a_hard_error() {
        let mut tuner = tuner_with_metrics(5, 0.5);
        assert!(matches!(
            tuner.tune_parameter("does_not_exist"),
            Err(TuningError::UnknownParameter(_))
        ));
    }

    #[test]
    fn tune_locked_parameter_is_a_hard_error() {
        let mut tuner = tuner_with_metrics(5, 0.5);
        tuner.lock_parameter("rule_priority_weight").unwrap();
        assert!(matches!(
            tuner.tune_parameter("rule_priority_weight"),
            Err(TuningError::LockedParameter(_))
        ));
    }

    #[test]
    fn first_adjustment_goes_upward_by_step_times_multiplier() {
        let mut tuner = tuner_with_metrics(5, 0.5);
        let record = tuner.tune_parameter("rule_priority_weight").unwrap();

        // Balanced = 2 steps of 0.1 upward from the 0.7 default.
        assert!((record.old_value - 0.7).abs() < 1e-9);
        assert!((record.new_value - 0.9).abs() < 1e-9);
        assert!(record.performance_before.is_some());
        assert!(record.performance_after.is_none());
    }

    #[test]
    fn adjustment_respects_progressive_bound_for_every_level() {
        for (level, multiplier) in [
            (Aggressiveness::Conservative, 1.0),
            (Aggressiveness::Balanced, 2.0),
            (Aggressiveness::Aggressive, 3.0),
        ] {
            let mut tuner = tuner_with_metrics(5, 0.5);
            tuner.set_aggressiveness(level);
            let record = tuner.tune_parameter("state_switch_threshold").unwrap();
            let step = tuner.parameter("state_switch_threshold").unwrap().step();
            assert!(
                record.delta().abs() <= step * multiplier + 1e-12,
                "{level}: |delta| {} exceeds {}",
                record.delta().abs(),
                step * multiplier
            );
        }
    }

    #[test]
    fn value_stays_in_range_under_repeated_tuning() {
        let mut tuner = tuner_with_metrics(5, 0.5);
        tuner.set_aggressiveness(Aggressiveness::Aggressive);
        for _ in 0..50 {
            let record = tuner.tune_parameter("rule_priority_weight").unwrap();
            let space = tuner.parameter("rule_priority_weight").unwrap();
            assert!(record.new_value >= space.min_value());
            assert!(record.new_value <= space.max_value());
        }
    }

    #[test]
    fn boundary_clamp_triggers_reverse_probe() {
        let mut tuner = tuner_with_metrics(5, 0.5);
        // Drive the parameter to its maximum.
        assert!(tuner.set_parameter_value("rule_priority_weight", 1.0));
        let record = tuner.tune_parameter("rule_priority_weight").unwrap();
        // Upward movement is impossible, so the tuner probes downward.
        assert!(record.new_value < record.old_value);
    }

    #[test]
    fn direction_repeats_after_improvement_and_flips_after_regression() {
        let mut tuner = tuner_with_metrics(5, 0.5);

        let mut first = tuner.tune_parameter("rule_priority_weight").unwrap();
        assert!(first.delta() > 0.0, "first adjustment goes up");

        // Report an improvement; the next adjustment keeps the direction.
        first.performance_before = Some(metric(0.2));
        first.performance_after = Some(metric(0.9));
        let index = tuner.records.len() - 1;
        tuner.records[index] = first.clone();
        let second = tuner.tune_parameter("rule_priority_weight").unwrap();
        assert!(second.delta() > 0.0, "improvement repeats the direction");

        // Report a regression; the next adjustment flips.
        let mut second = second;
        second.performance_before = Some(metric(0.9));
        second.performance_after = Some(metric(0.1));
        let index = tuner.records.len() - 1;
        tuner.records[index] = second;
        let third = tuner.tune_parameter("rule_priority_weight").unwrap();
        assert!(third.delta() < 0.0, "regression flips the direction");
    }

    // ----------------------------------------------------------------
    // Rollback
    // ----------------------------------------------------------------

    #[test]
    fn regression_rolls_back_to_the_old_value() {
        let mut tuner = tuner_with_metrics(5, 0.9);
        let mut record = tuner.tune_parameter("rule_priority_weight").unwrap();

        // Replace the baseline with a high score, then collect clearly worse
        // metrics so the evaluation window regresses.
        record.performance_before = Some(metric(0.95));
        for _ in 0..5 {
            tuner.collect_metric(metric(0.05));
        }

        let kept = tuner.evaluate_and_rollback_if_needed(&mut record);
        assert!(!kept, "regression must be reverted");
        let current = tuner.parameter("rule_priority_weight").unwrap().current_value();
        assert!(
            (current - record.old_value).abs() < 1e-9,
            "value restored to pre-adjustment state"
        );
        assert!(record.performance_after.is_some());
    }

    #[test]
    fn equal_or_better_performance_keeps_the_adjustment() {
        let mut tuner = tuner_with_metrics(5, 0.5);
        let mut record = tuner.tune_parameter("rule_priority_weight").unwrap();
        record.performance_before = Some(metric(0.0));

        let kept = tuner.evaluate_and_rollback_if_needed(&mut record);
        assert!(kept);
        let current = tuner.parameter("rule_priority_weight").unwrap().current_value();
        assert!((current - record.new_value).abs() < 1e-9);
    }

    #[test]
    fn evaluation_updates_the_stored_record() {
        let mut tuner = tuner_with_metrics(5, 0.5);
        let mut record = tuner.tune_parameter("rule_priority_weight").unwrap();
        tuner.evaluate_and_rollback_if_needed(&mut record);
        assert!(
            tuner.records().last().unwrap().performance_after.is_some(),
            "stored trail carries the after metric"
        );
    }

    // ----------------------------------------------------------------
    // Parameter surfaces
    // ----------------------------------------------------------------

    #[test]
    fn set_parameter_value_is_a_soft_failure() {
        let mut tuner = AutoTuner::new(true, Aggressiveness::Balanced);
        assert!(!tuner.set_parameter_value("nope", 0.5));

        tuner.lock_parameter("action_cooldown").unwrap();
        assert!(!tuner.set_parameter_value("action_cooldown", 1.0));

        assert!(tuner.set_parameter_value("rule_priority_weight", 5.0));
        let value = tuner.parameter("rule_priority_weight").unwrap().current_value();
        assert!((value - 1.0).abs() < 1e-9, "clamped to max");
    }

    #[test]
    fn reset_to_defaults_skips_locked_parameters() {
        let mut tuner = AutoTuner::new(true, Aggressiveness::Balanced);
        tuner.set_parameter_value("rule_priority_weight", 0.3);
        tuner.set_parameter_value("action_cooldown", 1.7);
        tuner.lock_parameter("action_cooldown").unwrap();

        tuner.reset_to_defaults();

        let weight = tuner.parameter("rule_priority_weight").unwrap();
        assert!((weight.current_value() - weight.default_value()).abs() < 1e-9);
        let cooldown = tuner.parameter("action_cooldown").unwrap();
        assert!(
            (cooldown.current_value() - 1.7).abs() < 1e-9,
            "locked parameter unchanged"
        );
    }

    #[test]
    fn reset_single_parameter_respects_lock() {
        let mut tuner = AutoTuner::new(true, Aggressiveness::Balanced);
        assert!(matches!(
            tuner.reset_parameter_to_default("nope"),
            Err(TuningError::UnknownParameter(_))
        ));

        tuner.set_parameter_value("rule_priority_weight", 0.2);
        assert!(tuner.reset_parameter_to_default("rule_priority_weight").unwrap());

        tuner.lock_parameter("action_cooldown").unwrap();
        assert!(!tuner.reset_parameter_to_default("action_cooldown").unwrap());
    }

    #[test]
    fn diff_surfaces_are_exact() {
        let mut tuner = AutoTuner::new(true, Aggressiveness::Balanced);
        assert!(tuner.parameter_diff().is_empty(), "defaults have no diff");

        tuner.set_parameter_value("rule_priority_weight", 0.9);
        let diff = tuner.parameter_diff();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff["rule_priority_weight"], (0.9, 0.7));

        let all = tuner.all_parameter_diff();
        assert_eq!(all.len(), 4);
        let (current, default, delta) = all["rule_priority_weight"];
        assert!((current - 0.9).abs() < 1e-9);
        assert!((default - 0.7).abs() < 1e-9);
        assert!((delta - (current - default)).abs() < 1e-12);
    }

    // ----------------------------------------------------------------
    // auto_tune_cycle
    // ----------------------------------------------------------------

    #[test]
    fn cycle_prefers_the_least_tuned_parameter() {
        let mut tuner = tuner_with_metrics(5, 0.5);
        // BTreeMap order: action_cooldown is first among equals.
        let first = tuner.auto_tune_cycle().expect("cycle runs");
        assert_eq!(first.parameter_name, "action_cooldown");

        let second = tuner.auto_tune_cycle().expect("cycle runs");
        assert_eq!(
            second.parameter_name, "detection_confidence_threshold",
            "round-robin moves to the next untouched parameter"
        );
    }

    #[test]
    fn cycle_skips_when_gated_or_fully_locked() {
        let mut tuner = tuner_with_metrics(3, 0.5);
        assert!(tuner.auto_tune_cycle().is_none(), "not enough metrics");

        let mut tuner = tuner_with_metrics(5, 0.5);
        for name in tuner.unlocked_parameters() {
            tuner.lock_parameter(&name).unwrap();
        }
        assert!(tuner.auto_tune_cycle().is_none(), "everything locked");
    }

    // ----------------------------------------------------------------
    // Aggressiveness helpers
    // ----------------------------------------------------------------

    #[test]
    fn aggressiveness_multipliers_and_parsing() {
        assert_eq!(Aggressiveness::Conservative.step_multiplier(), 1);
        assert_eq!(Aggressiveness::Balanced.step_multiplier(), 2);
        assert_eq!(Aggressiveness::Aggressive.step_multiplier(), 3);

        assert_eq!(
            Aggressiveness::from_str_lossy("AGGRESSIVE"),
            Aggressiveness::Aggressive
        );
        assert_eq!(
            Aggressiveness::from_str_lossy("turbo"),
            Aggressiveness::Conservative
        );
        assert_eq!(Aggressiveness::Balanced.to_string(), "balanced");
    }
}
