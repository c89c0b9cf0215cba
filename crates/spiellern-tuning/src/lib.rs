#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Closed-loop parameter tuning for spiellern.
//!
//! This crate owns the tunable parameter spaces, collects performance
//! metrics, and adjusts parameters in bounded, reversible steps. It follows
//! the principle: **every automatic adjustment is recorded and can be rolled
//! back when the observed performance regresses**.

pub mod error;
pub mod metric;
pub mod parameter;
pub mod record;
pub mod store;
pub mod tuner;

pub use error::TuningError;
pub use metric::{MetricStore, PerformanceMetric};
pub use parameter::{default_parameter_spaces, ParameterSpace};
pub use record::TuningRecord;
pub use store::TuningStore;
pub use tuner::{Aggressiveness, AutoTuner};
