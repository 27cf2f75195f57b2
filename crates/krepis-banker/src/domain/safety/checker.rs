//! SafetyChecker - Banker's Safety Algorithm

use crate::domain::resources::{ProcessId, ResourceState};
use serde::Serialize;

/// Outcome of one safety check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyReport {
    /// `true` iff every process could finish
    pub safe: bool,

    /// Completion order found (complete when safe, partial otherwise)
    pub sequence: Vec<ProcessId>,

    /// Processes that could not finish (empty when safe)
    pub blocked: Vec<ProcessId>,
}

impl SafetyReport {
    /// Split into the `(is_safe, safe_sequence)` pair
    pub fn into_parts(self) -> (bool, Vec<ProcessId>) {
        (self.safe, self.sequence)
    }
}

/// Banker's safety algorithm
///
/// Stateless; a pure function of the `ResourceState` it is given.
pub struct SafetyChecker;

impl SafetyChecker {
    /// Run the safety algorithm against `state`
    ///
    /// # Returns
    ///
    /// A report whose `sequence` lists processes in the order they
    /// finished. Identical states always produce identical reports.
    pub fn check(state: &ResourceState) -> SafetyReport {
        let n = state.num_processes();
        let need = state.need();
        let allocation = state.allocation();

        let mut work: Vec<u64> = state.available().iter().map(|&u| u64::from(u)).collect();
        let mut finish = vec![false; n];
        let mut sequence = Vec::with_capacity(n);

        loop {
            let mut progressed = false;

            for p in 0..n {
                if finish[p] {
                    continue;
                }
                let fits = need[p]
                    .iter()
                    .zip(&work)
                    .all(|(&demand, &free)| u64::from(demand) <= free);
                if !fits {
                    continue;
                }

                for (free, &held) in work.iter_mut().zip(&allocation[p]) {
                    *free += u64::from(held);
                }
                finish[p] = true;
                sequence.push(ProcessId(p));
                progressed = true;
            }

            if sequence.len() == n || !progressed {
                break;
            }
        }

        let blocked: Vec<ProcessId> = (0..n).filter(|&p| !finish[p]).map(ProcessId).collect();
        SafetyReport {
            safe: blocked.is_empty(),
            sequence,
            blocked,
        }
    }

    /// Convenience form returning `(is_safe, safe_sequence)`
    pub fn is_safe(state: &ResourceState) -> (bool, Vec<ProcessId>) {
        Self::check(state).into_parts()
    }
}
