//! Performance metrics and their time-windowed aggregation.

use crate::error::{Result, TuningError};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

// Overall-score weights. Stuck events enter as a penalty, not a rate: every
// stuck observation costs a fixed amount, capped so a pathological session
// cannot push the score below zero on its own.
/// Weight of the action success rate in the overall score.
const SUCCESS_RATE_WEIGHT: f64 = 0.3;
/// Weight of the state recognition accuracy in the overall score.
const STATE_ACCURACY_WEIGHT: f64 = 0.3;
/// Weight of the task efficiency in the overall score.
const TASK_EFFICIENCY_WEIGHT: f64 = 0.4;
/// Score penalty per observed stuck event.
const STUCK_PENALTY_PER_EVENT: f64 = 0.05;
/// Maximum total stuck penalty.
const STUCK_PENALTY_CAP: f64 = 0.5;

/// One sampled performance observation.
///
/// Validated on construction: the three rate fields must lie in
/// `0.0..=1.0`. A negative stuck count is ruled out by the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub action_success_rate: f64,
    pub state_accuracy: f64,
    pub stuck_count: u32,
    pub task_efficiency: f64,
}

impl PerformanceMetric {
    pub fn new(
        action_success_rate: f64,
        state_accuracy: f64,
        stuck_count: u32,
        task_efficiency: f64,
    ) -> Result<Self> {
        let metric = Self {
            timestamp: OffsetDateTime::now_utc(),
            action_success_rate,
            state_accuracy,
            stuck_count,
            task_efficiency,
        };
        metric.validate()?;
        Ok(metric)
    }

    /// Range check shared by the constructor and the persistence loader.
    pub(crate) fn validate(&self) -> Result<()> {
        fn check(field: &'static str, value: f64) -> Result<()> {
            if (0.0..=1.0).contains(&value) && value.is_finite() {
                Ok(())
            } else {
                Err(TuningError::MetricOutOfRange { field, value })
            }
        }
        check("action_success_rate", self.action_success_rate)?;
        check("state_accuracy", self.state_accuracy)?;
        check("task_efficiency", self.task_efficiency)?;
        Ok(())
    }

    /// Collapse the metric into a single comparable score in `0.0..=1.0`.
    #[must_use]
    pub fn overall_score(&self) -> f64 {
        let stuck_penalty =
            (f64::from(self.stuck_count) * STUCK_PENALTY_PER_EVENT).min(STUCK_PENALTY_CAP);
        let score = self.action_success_rate * SUCCESS_RATE_WEIGHT
            + self.state_accuracy * STATE_ACCURACY_WEIGHT
            + self.task_efficiency * TASK_EFFICIENCY_WEIGHT
            - stuck_penalty;
        score.clamp(0.0, 1.0)
    }
}

impl Default for PerformanceMetric {
    /// The zero metric, used for empty aggregation windows.
    fn default() -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            action_success_rate: 0.0,
            state_accuracy: 0.0,
            stuck_count: 0,
            task_efficiency: 0.0,
        }
    }
}

/// Append-only buffer of performance samples.
#[derive(Debug, Default)]
pub struct MetricStore {
    metrics: Vec<PerformanceMetric>,
}

impl MetricStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metric: PerformanceMetric) {
        self.metrics.push(metric);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn clear(&mut self) {
        self.metrics.clear();
    }

    #[must_use]
    pub fn all(&self) -> &[PerformanceMetric] {
        &self.metrics
    }

    pub(crate) fn replace(&mut self, metrics: Vec<PerformanceMetric>) {
        self.metrics = metrics;
    }

    /// Samples whose timestamp falls within the last `window_minutes` before
    /// `now`. A zero-width window is empty.
    #[must_use]
    pub fn in_window(&self, now: OffsetDateTime, window_minutes: u32) -> Vec<&PerformanceMetric> {
        if window_minutes == 0 {
            return Vec::new();
        }
        let cutoff = now - Duration::minutes(i64::from(window_minutes));
        self.metrics
            .iter()
            .filter(|m| m.timestamp >= cutoff)
            .collect()
    }

    /// Aggregate the window into one synthetic metric: arithmetic means for
    /// the three rates, the **sum** for `stuck_count` (stuck events are
    /// cumulative evidence, not a rate). An empty window yields the zero
    /// metric.
    #[must_use]
    pub fn aggregated(&self, window_minutes: u32) -> PerformanceMetric {
        self.aggregated_at(OffsetDateTime::now_utc(), window_minutes)
    }

    pub(crate) fn aggregated_at(
        &self,
        now: OffsetDateTime,
        window_minutes: u32,
    ) -> PerformanceMetric {
        let window = self.in_window(now, window_minutes);
        if window.is_empty() {
            return PerformanceMetric::default();
        }

        #[allow(clippy::cast_precision_loss)]
        let count = window.len() as f64;
        PerformanceMetric {
            timestamp: now,
            action_success_rate: window.iter().map(|m| m.action_success_rate).sum::<f64>()
                / count,
            state_accuracy: window.iter().map(|m| m.state_accuracy).sum::<f64>() / count,
            stuck_count: window.iter().map(|m| m.stuck_count).sum(),
            task_efficiency: window.iter().map(|m| m.task_efficiency).sum::<f64>() / count,
        }
    }
}
