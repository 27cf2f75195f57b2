//! Simulation Configuration

use crate::domain::error::{BankerError, BankerResult};
use crate::domain::resources::{MAX_PROCESSES, MAX_RESOURCES};
use crate::domain::risk::RiskThresholds;
use crate::domain::workload::simulator::DEFAULT_OVERSHOOT_PROBABILITY;
use serde::{Deserialize, Serialize};

/// Tunables for one simulation session
///
/// Every field has a default, so a partial JSON document such as
/// `{"seed": 7}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Upper bound on the number of processes
    pub max_processes: usize,
    /// Upper bound on the number of resource types
    pub max_resources: usize,
    /// Requests per cycle are drawn from `1..=max_requests_per_cycle`
    pub max_requests_per_cycle: usize,
    /// Per-type chance of asking one unit beyond declared need
    pub overshoot_probability: f64,
    /// Seed for the random source
    pub seed: u64,
    /// Risk band edges; `critical` triggers preemption, `high` triggers delay
    pub thresholds: RiskThresholds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_processes: MAX_PROCESSES,
            max_resources: MAX_RESOURCES,
            max_requests_per_cycle: 3,
            overshoot_probability: DEFAULT_OVERSHOOT_PROBABILITY,
            seed: 0x5EED,
            thresholds: RiskThresholds::default(),
        }
    }
}

impl SimulationConfig {
    /// Check value ranges
    ///
    /// # Errors
    /// `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> BankerResult<()> {
        if self.max_processes == 0 || self.max_resources == 0 {
            return Err(BankerError::InvalidConfig(
                "max_processes and max_resources must be at least 1".to_string(),
            ));
        }
        if self.max_requests_per_cycle == 0 {
            return Err(BankerError::InvalidConfig(
                "max_requests_per_cycle must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.overshoot_probability) {
            return Err(BankerError::InvalidConfig(format!(
                "overshoot_probability {} outside [0, 1]",
                self.overshoot_probability
            )));
        }
        let t = &self.thresholds;
        let ordered = 0.0 <= t.moderate && t.moderate <= t.high && t.high <= t.critical && t.critical <= 1.0;
        if !ordered {
            return Err(BankerError::InvalidConfig(format!(
                "thresholds must satisfy 0 <= moderate ({}) <= high ({}) <= critical ({}) <= 1",
                t.moderate, t.high, t.critical
            )));
        }
        Ok(())
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> BankerResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BankerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
