//! DeadlockDetector - SAFE / DEADLOCKED Classification

use super::checker::SafetyChecker;
use crate::domain::resources::{ProcessId, ResourceState};
use serde::Serialize;
use std::fmt;

/// System classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// A safe sequence exists
    Safe,
    /// No ordering lets every process finish
    Deadlocked,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => f.write_str("SAFE"),
            Self::Deadlocked => f.write_str("DEADLOCKED"),
        }
    }
}

/// Detector output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    /// Classification
    pub verdict: Verdict,
    /// Safe sequence when `Safe`; empty when `Deadlocked`
    pub safe_sequence: Vec<ProcessId>,
    /// Processes that cannot finish when `Deadlocked`
    pub deadlocked: Vec<ProcessId>,
}

impl Detection {
    /// Check if the state was classified as deadlocked
    #[inline]
    pub fn is_deadlocked(&self) -> bool {
        self.verdict == Verdict::Deadlocked
    }
}

/// Thin classifier over [`SafetyChecker`]
pub struct DeadlockDetector;

impl DeadlockDetector {
    /// Classify `state`
    pub fn detect(state: &ResourceState) -> Detection {
        let report = SafetyChecker::check(state);
        if report.safe {
            Detection {
                verdict: Verdict::Safe,
                safe_sequence: report.sequence,
                deadlocked: Vec::new(),
            }
        } else {
            Detection {
                verdict: Verdict::Deadlocked,
                safe_sequence: Vec::new(),
                deadlocked: report.blocked,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_safe() {
        let state = ResourceState::initialize(
            2,
            1,
            vec![vec![1], vec![1]],
            vec![vec![2], vec![2]],
            vec![1],
        )
        .unwrap();
        let detection = DeadlockDetector::detect(&state);
        assert_eq!(detection.verdict, Verdict::Safe);
        assert_eq!(detection.safe_sequence, vec![ProcessId(0), ProcessId(1)]);
        assert!(detection.deadlocked.is_empty());
    }

    #[test]
    fn test_detect_deadlock() {
        // Each holds one unit and needs one more; nothing free
        let state = ResourceState::initialize(
            2,
            1,
            vec![vec![1], vec![1]],
            vec![vec![2], vec![2]],
            vec![0],
        )
        .unwrap();
        let detection = DeadlockDetector::detect(&state);
        assert!(detection.is_deadlocked());
        assert!(detection.safe_sequence.is_empty());
        assert_eq!(detection.deadlocked, vec![ProcessId(0), ProcessId(1)]);
    }

    #[test]
    fn test_verdict_display_and_serde() {
        assert_eq!(Verdict::Safe.to_string(), "SAFE");
        assert_eq!(Verdict::Deadlocked.to_string(), "DEADLOCKED");
        assert_eq!(
            serde_json::to_string(&Verdict::Deadlocked).unwrap(),
            "\"DEADLOCKED\""
        );
    }
}
