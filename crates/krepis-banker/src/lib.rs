//! Krepis Banker - Deadlock-Aware Resource Simulator
//!
//! # Overview
//!
//! `krepis-banker` models a fixed set of processes competing for a fixed
//! set of resource types. Every cycle it generates stochastic requests,
//! admits them only when the Banker's safety check still holds, scores
//! how close the system is to deadlock, and resolves deadlocks by
//! preempting or terminating a victim.
//!
//! # Trinity Architecture
//!
//! - **Domain**: resource state, safety check, risk model, resolution policy
//! - **Infrastructure**: scenario documents (JSON files)
//! - **Adapters**: cycle observers that publish reports
//!
//! # Physical Laws (Invariants)
//!
//! - **R-001**: Conservation - `available[j] + Σ allocation[i][j]` never changes
//! - **R-002**: Derived Need - `need = max(maximum - allocation, 0)` after every mutation
//! - **R-003**: Exact Rollback - a rejected grant leaves no trace in the matrices
//!
//! # Usage
//!
//! ```rust
//! use krepis_banker::domain::{Scenario, SimulationBuilder, Continuation};
//!
//! let mut engine = SimulationBuilder::new()
//!     .seed(7)
//!     .max_requests_per_cycle(2)
//!     .build(Scenario::classic())
//!     .unwrap();
//!
//! let summary = engine.run(5, |_| Continuation::Continue);
//! assert_eq!(summary.cycles, 5);
//! assert!(engine.state().is_conserved());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Trinity Architecture Layers
pub mod domain;
pub mod infrastructure;
pub mod adapters;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Re-export Primary Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// State types
pub use domain::{
    BankerError,
    BankerResult,
    ProcessId,
    ProcessStatus,
    ResourceState,
    ResourceTypeId,
    StateSnapshot,
    Units,
};

// Algorithm types
pub use domain::{
    DeadlockDetector,
    Detection,
    PressureTracker,
    ResolutionPolicy,
    RiskAssessment,
    RiskLevel,
    RiskPredictor,
    SafetyChecker,
    SafetyReport,
    Verdict,
    WorkloadSimulator,
};

// Simulation types
pub use domain::{
    Continuation,
    CycleReport,
    Scenario,
    SimulationBuilder,
    SimulationConfig,
    SimulationEngine,
    SimulationSummary,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
