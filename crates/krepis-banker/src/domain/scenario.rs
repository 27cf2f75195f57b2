//! Initial Resource Scenario
//!
//! The structured form of the ingress data: an allocation matrix, a
//! maximum-claim matrix and an available vector. Dimensions are
//! implied by the shapes and validated when the state is built.

use crate::domain::config::SimulationConfig;
use crate::domain::error::{BankerError, BankerResult};
use crate::domain::resources::{ResourceState, Units};
use serde::{Deserialize, Serialize};

/// Starting matrices for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Units held per process per resource type
    pub allocation: Vec<Vec<Units>>,
    /// Declared maximum claim per process per resource type
    pub maximum: Vec<Vec<Units>>,
    /// Free units per resource type
    pub available: Vec<Units>,
}

impl Scenario {
    /// The five-process, three-resource textbook example (safe)
    pub fn classic() -> Self {
        Self {
            allocation: vec![
                vec![0, 1, 0],
                vec![2, 0, 0],
                vec![3, 0, 2],
                vec![2, 1, 1],
                vec![0, 0, 2],
            ],
            maximum: vec![
                vec![7, 5, 3],
                vec![3, 2, 2],
                vec![9, 0, 2],
                vec![2, 2, 2],
                vec![4, 3, 3],
            ],
            available: vec![3, 3, 2],
        }
    }

    /// Number of processes (rows of `allocation`)
    pub fn num_processes(&self) -> usize {
        self.allocation.len()
    }

    /// Number of resource types (length of `available`)
    pub fn num_resources(&self) -> usize {
        self.available.len()
    }

    /// Decode a JSON document
    pub fn from_json_str(json: &str) -> BankerResult<Self> {
        serde_json::from_str(json).map_err(|e| BankerError::Scenario(e.to_string()))
    }

    /// Validate against `config` bounds and build the state
    pub fn into_state(self, config: &SimulationConfig) -> BankerResult<ResourceState> {
        let processes = self.num_processes();
        let resources = self.num_resources();
        ResourceState::initialize_bounded(
            (config.max_processes, config.max_resources),
            processes,
            resources,
            self.allocation,
            self.maximum,
            self.available,
        )
    }
}
