use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TRIALS, MAX_FIELD_SIZE, PROGRESS_INTERVAL};
use crate::error::{Result, SimError};

/// What to do when a single pool cannot be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failed pool.
    #[default]
    FailFast,
    /// Log the failed pool and move on to the next one.
    FailSoft,
}

/// Which tournament outcomes the reports are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// The picks each winning entry submitted to its pool.
    #[default]
    Snapshot,
    /// A fresh simulation of each winning bracket on every report.
    Resample,
}

/// Configuration for a multi-pool run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pools to simulate.
    pub num_pools: usize,
    /// Entries competing in each pool.
    pub entries_per_pool: usize,
    /// Trials used to rank each pool.
    pub trials_per_pool: usize,
    /// Teams in the tournament field.
    pub field_size: usize,
    /// Seed for reproducibility (None = random).
    pub seed: Option<u64>,
    pub failure_policy: FailurePolicy,
    /// Extra attempts for a failed pool before the policy applies.
    pub max_retries: usize,
    /// Pools between progress log events.
    pub progress_interval: usize,
    pub mode: AnalysisMode,
    /// Re-simulate winning brackets on the rayon pool (resample mode only).
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            num_pools: 100,
            entries_per_pool: 10,
            trials_per_pool: DEFAULT_TRIALS,
            field_size: MAX_FIELD_SIZE,
            seed: None,
            failure_policy: FailurePolicy::FailFast,
            max_retries: 0,
            progress_interval: PROGRESS_INTERVAL,
            mode: AnalysisMode::Snapshot,
            parallel: false,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_pools == 0 {
            return Err(SimError::InvalidConfig("num_pools must be positive".to_string()));
        }
        if self.entries_per_pool == 0 {
            return Err(SimError::InvalidConfig(
                "entries_per_pool must be positive".to_string(),
            ));
        }
        if self.trials_per_pool == 0 {
            return Err(SimError::InvalidConfig(
                "trials_per_pool must be positive".to_string(),
            ));
        }
        if self.field_size < 2 || !self.field_size.is_power_of_two() || self.field_size > MAX_FIELD_SIZE
        {
            return Err(SimError::InvalidConfig(format!(
                "field_size must be a power of two between 2 and {}, got {}",
                MAX_FIELD_SIZE, self.field_size
            )));
        }
        if self.progress_interval == 0 {
            return Err(SimError::InvalidConfig(
                "progress_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
