//! PressureTracker - Decaying Per-Resource Demand Signal

use crate::domain::resources::Units;

/// Per-resource-type accumulator of recently requested volume
///
/// Feeds the risk heuristic only; it plays no part in safety.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressureTracker {
    pressure: Vec<u64>,
}

impl PressureTracker {
    /// Create a tracker for `num_resources` types, all at zero
    pub fn new(num_resources: usize) -> Self {
        Self {
            pressure: vec![0; num_resources],
        }
    }

    /// Add a request vector to the accumulators
    pub fn accumulate(&mut self, request: &[Units]) {
        for (slot, &units) in self.pressure.iter_mut().zip(request) {
            *slot += u64::from(units);
        }
    }

    /// Apply one cycle of decay: `p = p * 3 / 4`
    pub fn decay(&mut self) {
        for slot in &mut self.pressure {
            *slot = *slot * 3 / 4;
        }
    }

    /// Current accumulator values
    pub fn values(&self) -> &[u64] {
        &self.pressure
    }

    /// Sum over all resource types
    pub fn total(&self) -> u64 {
        self.pressure.iter().sum()
    }
}
