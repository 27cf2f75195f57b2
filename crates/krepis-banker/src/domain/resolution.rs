//! Domain Model: Deadlock Resolution Policy
//!
//! Victim selection plus the three corrective actions:
//!
//! - **Preempt**: reclaim one unit of every type the victim holds
//! - **Terminate**: release everything and zero the victim's rows
//! - **Delay**: hold new requests back for one cycle (no state change)
//!
//! [`ResolutionPolicy::resolve`] decides which to apply from the
//! detector verdict and the risk score.

use crate::domain::resources::{ProcessId, ResourceState, Units};
use crate::domain::risk::{RiskAssessment, RiskThresholds};
use crate::domain::safety::{Detection, SafetyChecker};
use serde::Serialize;
use tracing::{info, warn};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcomes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of a single preemption attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PreemptOutcome {
    /// Units reclaimed from `victim` (one per held resource type)
    Preempted {
        /// Process the units were taken from
        victim: ProcessId,
        /// Number of units reclaimed
        units: u32,
    },
    /// No process held anything that could be reclaimed
    NoVictim,
}

impl PreemptOutcome {
    /// Units reclaimed, zero for `NoVictim`
    pub fn units(&self) -> u32 {
        match self {
            Self::Preempted { units, .. } => *units,
            Self::NoVictim => 0,
        }
    }
}

/// A corrective action that was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResolutionAction {
    /// One unit per held type taken back
    Preempt {
        /// Process trimmed
        victim: ProcessId,
        /// Units reclaimed
        units: u32,
    },
    /// Process removed and all its units released
    Terminate {
        /// Process terminated
        victim: ProcessId,
        /// Units returned per resource type
        released: Vec<Units>,
    },
    /// New requests deferred for one cycle
    Delay,
}

/// What prompted the resolution pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTrigger {
    /// Detector reported `DEADLOCKED`
    Deadlock,
    /// Risk above the critical threshold
    CriticalRisk,
    /// Risk above the high threshold
    HighRisk,
}

/// Per-cycle resolution report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// State safe and risk below the high threshold
    NotNeeded,
    /// Actions were applied
    Applied {
        /// Why the policy acted
        trigger: ResolutionTrigger,
        /// Actions in the order applied
        actions: Vec<ResolutionAction>,
        /// Safety verdict after the last action
        safe_after: bool,
    },
    /// Action was warranted but no process holds any resources
    NoVictim {
        /// Why the policy tried to act
        trigger: ResolutionTrigger,
    },
}

impl Resolution {
    /// Check if the policy asked for new requests to be deferred
    pub fn is_delay(&self) -> bool {
        matches!(self, Self::Applied { actions, .. } if actions.contains(&ResolutionAction::Delay))
    }

    /// Actions applied (empty unless `Applied`)
    pub fn actions(&self) -> &[ResolutionAction] {
        match self {
            Self::Applied { actions, .. } => actions,
            _ => &[],
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Policy (Pure Strategy Functions)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Deadlock resolution rules
pub struct ResolutionPolicy;

impl ResolutionPolicy {
    /// Pick the process holding the strictly largest total allocation
    ///
    /// Ties go to the lowest index. Returns `None` when nobody holds
    /// anything, so an all-zero process is never chosen while another
    /// process holds resources.
    pub fn choose_victim(state: &ResourceState) -> Option<ProcessId> {
        let mut victim = None;
        let mut largest = 0u64;
        for i in 0..state.num_processes() {
            let held = state.total_allocation(ProcessId(i));
            if held > largest {
                largest = held;
                victim = Some(ProcessId(i));
            }
        }
        victim
    }

    /// Release all of `pid`'s units and zero its allocation, maximum and need
    ///
    /// Idempotent; out-of-range `pid` is ignored. Returns the units
    /// released (all zero on a repeat call, empty when out of range).
    pub fn terminate(state: &mut ResourceState, pid: ProcessId) -> Vec<Units> {
        if !state.contains(pid) {
            return Vec::new();
        }
        state.retire(pid)
    }

    /// Reclaim one unit of every resource type `pid` holds
    ///
    /// Partial: the caller must re-check safety afterwards.
    pub fn preempt_one_unit(state: &mut ResourceState, pid: ProcessId) -> PreemptOutcome {
        if !state.contains(pid) {
            return PreemptOutcome::NoVictim;
        }
        let mut units = 0u32;
        for j in 0..state.num_resources() {
            if state.reclaim_unit(pid, j) {
                units += 1;
            }
        }
        if units == 0 {
            PreemptOutcome::NoVictim
        } else {
            PreemptOutcome::Preempted { victim: pid, units }
        }
    }

    /// Choose a victim and preempt from it
    pub fn preempt_victim(state: &mut ResourceState) -> PreemptOutcome {
        match Self::choose_victim(state) {
            Some(pid) => Self::preempt_one_unit(state, pid),
            None => PreemptOutcome::NoVictim,
        }
    }

    /// Defer new requests for one cycle; touches no state
    pub fn delay() -> ResolutionAction {
        ResolutionAction::Delay
    }

    /// Decide and apply the corrective action for this cycle
    ///
    /// # Decision Rule
    ///
    /// 1. Deadlocked: preempt from the victim; if still unsafe, terminate
    ///    it; repeat until safe or no victim remains.
    /// 2. Risk above critical: preempt once from the victim.
    /// 3. Risk above high: delay.
    /// 4. Otherwise nothing.
    pub fn resolve(
        state: &mut ResourceState,
        detection: &Detection,
        risk: &RiskAssessment,
        thresholds: &RiskThresholds,
    ) -> Resolution {
        if detection.is_deadlocked() {
            return Self::recover(state);
        }

        if risk.probability > thresholds.critical {
            return match Self::preempt_victim(state) {
                PreemptOutcome::Preempted { victim, units } => {
                    info!(%victim, units, "critical risk: preempted");
                    Resolution::Applied {
                        trigger: ResolutionTrigger::CriticalRisk,
                        actions: vec![ResolutionAction::Preempt { victim, units }],
                        safe_after: SafetyChecker::check(state).safe,
                    }
                }
                PreemptOutcome::NoVictim => Resolution::NoVictim {
                    trigger: ResolutionTrigger::CriticalRisk,
                },
            };
        }

        if risk.probability > thresholds.high {
            info!(probability = risk.probability, "high risk: delaying new requests");
            return Resolution::Applied {
                trigger: ResolutionTrigger::HighRisk,
                actions: vec![Self::delay()],
                safe_after: true,
            };
        }

        Resolution::NotNeeded
    }

    /// Preempt-then-terminate loop for a deadlocked state
    fn recover(state: &mut ResourceState) -> Resolution {
        let mut actions = Vec::new();
        let mut safe = false;

        while let Some(victim) = Self::choose_victim(state) {
            if let PreemptOutcome::Preempted { units, .. } = Self::preempt_one_unit(state, victim) {
                info!(%victim, units, "deadlock: preempted");
                actions.push(ResolutionAction::Preempt { victim, units });
            }
            if SafetyChecker::check(state).safe {
                safe = true;
                break;
            }

            let released = Self::terminate(state, victim);
            warn!(%victim, ?released, "deadlock persists: terminated");
            actions.push(ResolutionAction::Terminate { victim, released });
            if SafetyChecker::check(state).safe {
                safe = true;
                break;
            }
        }

        if actions.is_empty() {
            warn!("deadlock detected but no process holds resources");
            return Resolution::NoVictim {
                trigger: ResolutionTrigger::Deadlock,
            };
        }

        Resolution::Applied {
            trigger: ResolutionTrigger::Deadlock,
            actions,
            safe_after: safe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::RiskLevel;
    use crate::domain::safety::DeadlockDetector;

    fn deadlocked_pair() -> ResourceState {
        // P0 holds [2,0] wants [2,1]; P1 holds [0,1] wants [1,1]; nothing free
        ResourceState::initialize(
            2,
            2,
            vec![vec![2, 0], vec![0, 1]],
            vec![vec![2, 1], vec![1, 1]],
            vec![0, 0],
        )
        .unwrap()
    }

    fn risk(probability: f64) -> RiskAssessment {
        RiskAssessment {
            probability,
            demand_ratio: 0.0,
            pressure_ratio: 0.0,
            concurrency: 0.0,
            level: RiskLevel::classify(probability, &RiskThresholds::default()),
        }
    }

    #[test]
    fn test_choose_victim_largest_then_lowest_index() {
        let state = ResourceState::initialize(
            3,
            2,
            vec![vec![1, 1], vec![2, 1], vec![0, 3]],
            vec![vec![5, 5], vec![5, 5], vec![5, 5]],
            vec![0, 0],
        )
        .unwrap();
        // P1 and P2 both hold 3; P1 reached it first
        assert_eq!(ResolutionPolicy::choose_victim(&state), Some(ProcessId(1)));
    }

    #[test]
    fn test_zero_allocation_never_victim() {
        let state = ResourceState::initialize(
            3,
            1,
            vec![vec![0], vec![1], vec![0]],
            vec![vec![2], vec![2], vec![2]],
            vec![0],
        )
        .unwrap();
        assert_eq!(ResolutionPolicy::choose_victim(&state), Some(ProcessId(1)));

        let empty = ResourceState::initialize(
            2,
            1,
            vec![vec![0], vec![0]],
            vec![vec![2], vec![2]],
            vec![1],
        )
        .unwrap();
        assert_eq!(ResolutionPolicy::choose_victim(&empty), None);
    }

    #[test]
    fn test_terminate_is_idempotent() {
        let mut once = deadlocked_pair();
        ResolutionPolicy::terminate(&mut once, ProcessId(0));

        let mut twice = deadlocked_pair();
        ResolutionPolicy::terminate(&mut twice, ProcessId(0));
        let second = ResolutionPolicy::terminate(&mut twice, ProcessId(0));

        assert_eq!(second, vec![0, 0]);
        assert_eq!(once, twice);
        assert_eq!(once.available(), &[2, 0]);
        assert!(once.is_conserved());
    }

    #[test]
    fn test_terminate_out_of_range_is_noop() {
        let mut state = deadlocked_pair();
        let before = state.clone();
        assert!(ResolutionPolicy::terminate(&mut state, ProcessId(9)).is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_preempt_one_unit_per_held_type() {
        let mut state = ResourceState::initialize(
            1,
            3,
            vec![vec![2, 0, 1]],
            vec![vec![3, 1, 1]],
            vec![0, 0, 0],
        )
        .unwrap();
        let outcome = ResolutionPolicy::preempt_one_unit(&mut state, ProcessId(0));
        assert_eq!(outcome, PreemptOutcome::Preempted { victim: ProcessId(0), units: 2 });
        assert_eq!(state.allocation()[0], vec![1, 0, 0]);
        assert_eq!(state.need()[0], vec![2, 1, 1]);
        assert_eq!(state.available(), &[1, 0, 1]);
        assert!(state.is_conserved());
    }

    #[test]
    fn test_preempt_without_victim() {
        let mut state = ResourceState::initialize(1, 1, vec![vec![0]], vec![vec![1]], vec![0]).unwrap();
        assert_eq!(ResolutionPolicy::preempt_victim(&mut state), PreemptOutcome::NoVictim);
        assert_eq!(
            ResolutionPolicy::preempt_one_unit(&mut state, ProcessId(4)),
            PreemptOutcome::NoVictim
        );
        assert_eq!(PreemptOutcome::NoVictim.units(), 0);
    }

    #[test]
    fn test_delay_changes_nothing() {
        let state = deadlocked_pair();
        let before = state.clone();
        assert_eq!(ResolutionPolicy::delay(), ResolutionAction::Delay);
        assert_eq!(state, before);
    }

    #[test]
    fn test_resolve_deadlock_by_preemption() {
        let mut state = deadlocked_pair();
        let detection = DeadlockDetector::detect(&state);
        assert!(detection.is_deadlocked());

        let resolution =
            ResolutionPolicy::resolve(&mut state, &detection, &risk(0.5), &RiskThresholds::default());

        // P0 (largest holder) gives back one R0; [1,0] free lets P1 finish, then P0
        assert_eq!(
            resolution,
            Resolution::Applied {
                trigger: ResolutionTrigger::Deadlock,
                actions: vec![ResolutionAction::Preempt { victim: ProcessId(0), units: 1 }],
                safe_after: true,
            }
        );
        assert!(state.is_conserved());
        assert!(!DeadlockDetector::detect(&state).is_deadlocked());
    }

    #[test]
    fn test_resolve_deadlock_escalates_to_termination() {
        // Single resource, each holds 1; P0 needs 2 more, P1 needs 1 more.
        // Taking P0's only unit still leaves P0 short after P1 finishes.
        let mut state = ResourceState::initialize(
            2,
            1,
            vec![vec![1], vec![1]],
            vec![vec![3], vec![2]],
            vec![0],
        )
        .unwrap();
        let detection = DeadlockDetector::detect(&state);
        let resolution =
            ResolutionPolicy::resolve(&mut state, &detection, &risk(0.9), &RiskThresholds::default());

        match resolution {
            Resolution::Applied { trigger, actions, safe_after } => {
                assert_eq!(trigger, ResolutionTrigger::Deadlock);
                assert!(safe_after);
                assert_eq!(
                    actions,
                    vec![
                        ResolutionAction::Preempt { victim: ProcessId(0), units: 1 },
                        ResolutionAction::Terminate { victim: ProcessId(0), released: vec![0] },
                    ]
                );
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
        assert!(state.is_terminated(ProcessId(0)));
        assert!(state.is_conserved());
    }

    #[test]
    fn test_resolve_deadlock_without_victim() {
        let mut state = ResourceState::initialize(1, 1, vec![vec![0]], vec![vec![2]], vec![1]).unwrap();
        let detection = DeadlockDetector::detect(&state);
        assert!(detection.is_deadlocked());
        let resolution =
            ResolutionPolicy::resolve(&mut state, &detection, &risk(0.0), &RiskThresholds::default());
        assert_eq!(resolution, Resolution::NoVictim { trigger: ResolutionTrigger::Deadlock });
    }

    #[test]
    fn test_resolve_by_risk_band() {
        let thresholds = RiskThresholds::default();
        let base = ResourceState::initialize(
            2,
            1,
            vec![vec![1], vec![2]],
            vec![vec![2], vec![4]],
            vec![3],
        )
        .unwrap();
        let detection = DeadlockDetector::detect(&base);
        assert!(!detection.is_deadlocked());

        let mut state = base.clone();
        let critical = ResolutionPolicy::resolve(&mut state, &detection, &risk(0.85), &thresholds);
        assert_eq!(
            critical.actions(),
            &[ResolutionAction::Preempt { victim: ProcessId(1), units: 1 }]
        );

        let mut state = base.clone();
        let high = ResolutionPolicy::resolve(&mut state, &detection, &risk(0.7), &thresholds);
        assert!(high.is_delay());
        assert_eq!(state, base);

        let mut state = base.clone();
        let low = ResolutionPolicy::resolve(&mut state, &detection, &risk(0.3), &thresholds);
        assert_eq!(low, Resolution::NotNeeded);
        assert_eq!(state, base);
    }
}
