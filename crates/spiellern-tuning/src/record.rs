//! Tuning records: the audit trail of every automatic parameter adjustment,
//! used for rollback and for inferring the next adjustment direction.

use crate::metric::PerformanceMetric;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub parameter_name: String,
    pub old_value: f64,
    pub new_value: f64,
    pub reason: String,
    /// Aggregated performance at adjustment time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_before: Option<PerformanceMetric>,
    /// Filled in later by the evaluation pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_after: Option<PerformanceMetric>,
}

impl TuningRecord {
    /// Signed size of the adjustment.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.new_value - self.old_value
    }

    /// Whether the adjustment improved the overall score.
    ///
    /// `None` until both before and after metrics are present. Equal scores
    /// count as an improvement, so a neutral adjustment is not reverted.
    #[must_use]
    pub fn is_improvement(&self) -> Option<bool> {
        let before = self.performance_before.as_ref()?;
        let after = self.performance_after.as_ref()?;
        Some(after.overall_score() >= before.overall_score())
    }
}
