//! Domain Layer - The Banker Assembly
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  Resources Module              Safety Module                │
//! │  ├─ ResourceState              ├─ SafetyChecker             │
//! │  ├─ ProcessId / ResourceTypeId └─ DeadlockDetector          │
//! │  └─ StateSnapshot                                           │
//! │                                                             │
//! │  Risk Module                   Resolution Module            │
//! │  ├─ RiskPredictor              └─ ResolutionPolicy          │
//! │  └─ PressureTracker               (preempt / terminate /    │
//! │                                     delay)                  │
//! │                                                             │
//! │  Workload Module               Simulation Module            │
//! │  ├─ WorkloadSimulator          ├─ SimulationEngine<R>       │
//! │  └─ RandomSource               └─ SimulationBuilder         │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Mutation Rules
//!
//! Only three places write to [`ResourceState`]: the speculative grant
//! in the workload simulator, preemption and termination in the
//! resolution policy. Everything else reads.
//!
//! ```rust
//! use krepis_banker::domain::*;
//!
//! let state = Scenario::classic()
//!     .into_state(&SimulationConfig::default())
//!     .unwrap();
//!
//! let detection = DeadlockDetector::detect(&state);
//! assert_eq!(detection.verdict, Verdict::Safe);
//! assert_eq!(
//!     detection.safe_sequence,
//!     vec![ProcessId(1), ProcessId(3), ProcessId(4), ProcessId(0), ProcessId(2)]
//! );
//! ```

pub mod config;
pub mod error;
pub mod resolution;
pub mod resources;
pub mod risk;
pub mod safety;
pub mod scenario;
pub mod simulation;
pub mod workload;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public API
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub use config::SimulationConfig;
pub use error::{BankerError, BankerResult};
pub use resolution::{
    PreemptOutcome, Resolution, ResolutionAction, ResolutionPolicy, ResolutionTrigger,
};
pub use resources::{
    ProcessId, ProcessStatus, ResourceState, ResourceTypeId, StateSnapshot, Units,
    MAX_PROCESSES, MAX_RESOURCES,
};
pub use risk::{PressureTracker, RiskAssessment, RiskLevel, RiskPredictor, RiskThresholds};
pub use safety::{DeadlockDetector, Detection, SafetyChecker, SafetyReport, Verdict};
pub use scenario::Scenario;
pub use simulation::{
    Continuation, CycleObserver, CycleReport, SimulationBuilder, SimulationEngine,
    SimulationSummary,
};
pub use workload::{
    RandomSource, RequestOutcome, RequestRecord, WorkloadSimulator, Xorshift64Star,
};
