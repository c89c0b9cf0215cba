//! Outcome feedback and closed-loop self-tuning.
//!
//! Callers report whether each executed action succeeded and whether the
//! agent got stuck. With an attached [`AutoTuner`] the engine periodically
//! turns those counters into a performance metric and lets the tuner adjust
//! one parameter; a tuned `rule_priority_weight` is applied straight back
//! onto the engine's blend weights.

use crate::engine::DecisionEngine;
use serde::Serialize;
use spiellern_tuning::{Aggressiveness, AutoTuner, PerformanceMetric, TuningRecord};
use std::collections::BTreeMap;
use std::time::Instant;

/// Seconds between automatic tuning cycles.
const TUNE_INTERVAL_SECS: f64 = 300.0;
/// Assumed state accuracy while the decision log is empty.
const DEFAULT_STATE_ACCURACY: f64 = 0.8;
/// Blend of success rate and accuracy used to estimate task efficiency.
const EFFICIENCY_SUCCESS_SHARE: f64 = 0.8;
const EFFICIENCY_ACCURACY_SHARE: f64 = 0.2;

/// Snapshot of the tuning subsystem for status surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct TunerStatus {
    pub available: bool,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggressiveness: Option<Aggressiveness>,
    pub metrics_count: usize,
    pub records_count: usize,
    pub locked_parameters: Vec<String>,
    pub parameter_diff: BTreeMap<String, (f64, f64)>,
}

impl DecisionEngine {
    /// Report the outcome of an executed action. Feeds the performance
    /// counters and, when a tuner is attached, the metric collection and
    /// tuning cycle.
    pub fn record_outcome(&mut self, success: bool, stuck: bool) {
        self.outcome.total += 1;
        if success {
            self.outcome.succeeded += 1;
        }
        if stuck {
            self.outcome.stuck += 1;
        }

        if self.tuner.is_some() {
            self.collect_performance_metric();
            self.try_auto_tune();
        }
    }

    /// Derive a performance metric from the running counters and the
    /// decision log, and hand it to the tuner.
    fn collect_performance_metric(&mut self) {
        if self.outcome.total == 0 {
            return;
        }

        #[allow(clippy::cast_precision_loss)]
        let success_rate = self.outcome.succeeded as f64 / self.outcome.total as f64;

        // State accuracy is estimated from the mean confidence of logged
        // decisions; with an empty log, fall back to a neutral default.
        let log = self.decision_log(usize::MAX);
        let state_accuracy = if log.is_empty() {
            DEFAULT_STATE_ACCURACY
        } else {
            #[allow(clippy::cast_precision_loss)]
            let mean =
                log.iter().map(|e| e.result.confidence).sum::<f64>() / log.len() as f64;
            mean.clamp(0.0, 1.0)
        };

        let task_efficiency = (EFFICIENCY_SUCCESS_SHARE * success_rate
            + EFFICIENCY_ACCURACY_SHARE * state_accuracy)
            .clamp(0.0, 1.0);

        match PerformanceMetric::new(
            success_rate,
            state_accuracy,
            self.outcome.stuck,
            task_efficiency,
        ) {
            Ok(metric) => {
                if let Some(tuner) = &mut self.tuner {
                    tuner.collect_metric(metric);
                }
            }
            Err(error) => tracing::warn!(%error, "derived performance metric was invalid"),
        }
    }

    /// Run one tuning cycle when the interval elapsed, applying the result
    /// back onto the engine.
    fn try_auto_tune(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_tune {
            if (now - last).as_secs_f64() < TUNE_INTERVAL_SECS {
                return;
            }
        }

        let record = match &mut self.tuner {
            Some(tuner) => tuner.auto_tune_cycle(),
            None => None,
        };
        if let Some(record) = record {
            self.last_tune = Some(now);
            self.apply_tuning(&record);
        }
    }

    /// Map a tuned parameter back onto engine state.
    fn apply_tuning(&mut self, record: &TuningRecord) {
        match record.parameter_name.as_str() {
            "rule_priority_weight" => {
                self.rule_weight = record.new_value;
                self.model_weight = 1.0 - record.new_value;
                tracing::info!(
                    rule_weight = self.rule_weight,
                    model_weight = self.model_weight,
                    "tuned blend weights applied"
                );
            }
            other => {
                // Knobs like action_cooldown are read by their owning
                // subsystems from the tuner; nothing to apply here.
                tracing::debug!(parameter = other, "tuned parameter has no direct engine binding");
            }
        }
    }

    /// Restore the tuner's parameters and the engine's blend weights to
    /// their configured defaults. Locked parameters stay untouched.
    pub fn reset_tuned_parameters(&mut self) {
        if let Some(tuner) = &mut self.tuner {
            tuner.reset_to_defaults();
        }
        self.rule_weight = self.config.rule_weight;
        self.model_weight = self.config.model_weight;
        tracing::info!("engine parameters reset to defaults");
    }

    /// Status summary of the attached tuner, or an "unavailable" marker.
    #[must_use]
    pub fn tuner_status(&self) -> TunerStatus {
        match &self.tuner {
            Some(tuner) => TunerStatus {
                available: true,
                enabled: tuner.is_enabled(),
                aggressiveness: Some(tuner.aggressiveness()),
                metrics_count: tuner.metrics_count(),
                records_count: tuner.records().len(),
                locked_parameters: tuner.locked_parameters(),
                parameter_diff: tuner.parameter_diff(),
            },
            None => TunerStatus {
                available: false,
                enabled: false,
                aggressiveness: None,
                metrics_count: 0,
                records_count: 0,
                locked_parameters: Vec::new(),
                parameter_diff: BTreeMap::new(),
            },
        }
    }

    /// Direct access to the attached tuner, e.g. for locking parameters
    /// from an operator surface.
    #[must_use]
    pub fn tuner(&self) -> Option<&AutoTuner> {
        self.tuner.as_ref()
    }

    #[must_use]
    pub fn tuner_mut(&mut self) -> Option<&mut AutoTuner> {
        self.tuner.as_mut()
    }
}
