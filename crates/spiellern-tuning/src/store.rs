//! JSON file persistence for tuning state.
//!
//! Three independent documents live in a configured directory: collected
//! metrics, tuning records, and parameter definitions. Loading is tolerant —
//! a missing file yields empty state, malformed content is logged and
//! dropped, and entries failing validation are skipped — so a damaged file
//! never prevents startup.

use crate::error::Result;
use crate::metric::PerformanceMetric;
use crate::parameter::ParameterSpace;
use crate::record::TuningRecord;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const METRICS_FILE: &str = "metrics.json";
const RECORDS_FILE: &str = "records.json";
const PARAMETERS_FILE: &str = "parameters.json";

#[derive(Debug, Clone)]
pub struct TuningStore {
    dir: PathBuf,
}

impl TuningStore {
    /// Bind the store to a directory, creating it if necessary.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn metrics_path(&self) -> PathBuf {
        self.dir.join(METRICS_FILE)
    }

    fn records_path(&self) -> PathBuf {
        self.dir.join(RECORDS_FILE)
    }

    fn parameters_path(&self) -> PathBuf {
        self.dir.join(PARAMETERS_FILE)
    }

    pub fn save_metrics(&self, metrics: &[PerformanceMetric]) -> Result<()> {
        let json = serde_json::to_string_pretty(metrics)?;
        fs::write(self.metrics_path(), json)?;
        Ok(())
    }

    #[must_use]
    pub fn load_metrics(&self) -> Vec<PerformanceMetric> {
        let Some(raw) = read_if_present(&self.metrics_path()) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<PerformanceMetric>>(&raw) {
            Ok(metrics) => metrics
                .into_iter()
                .filter(|metric| match metric.validate() {
                    Ok(()) => true,
                    Err(error) => {
                        tracing::warn!(%error, "skipping invalid persisted metric");
                        false
                    }
                })
                .collect(),
            Err(error) => {
                tracing::warn!(%error, "could not parse persisted metrics, starting empty");
                Vec::new()
            }
        }
    }

    pub fn save_records(&self, records: &[TuningRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        fs::write(self.records_path(), json)?;
        Ok(())
    }

    #[must_use]
    pub fn load_records(&self) -> Vec<TuningRecord> {
        let Some(raw) = read_if_present(&self.records_path()) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(%error, "could not parse persisted tuning records, starting empty");
                Vec::new()
            }
        }
    }

    pub fn save_parameters(&self, parameters: &BTreeMap<String, ParameterSpace>) -> Result<()> {
        let json = serde_json::to_string_pretty(parameters)?;
        fs::write(self.parameters_path(), json)?;
        Ok(())
    }

    #[must_use]
    pub fn load_parameters(&self) -> BTreeMap<String, ParameterSpace> {
        let Some(raw) = read_if_present(&self.parameters_path()) else {
            return BTreeMap::new();
        };
        match serde_json::from_str::<BTreeMap<String, ParameterSpace>>(&raw) {
            Ok(parameters) => parameters
                .into_iter()
                .filter(|(name, space)| match space.validate() {
                    Ok(()) => true,
                    Err(error) => {
                        tracing::warn!(name, %error, "skipping invalid persisted parameter");
                        false
                    }
                })
                .collect(),
            Err(error) => {
                tracing::warn!(%error, "could not parse persisted parameters, starting empty");
                BTreeMap::new()
            }
        }
    }
}

fn read_if_present(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "could not read persisted tuning state");
            None
        }
    }
}
