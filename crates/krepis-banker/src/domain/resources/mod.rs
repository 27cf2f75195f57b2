//! Resource Accounting
//!
//! # Architecture
//!
//! `ResourceState` owns the four Banker's matrices for one session:
//!
//! ```text
//! allocation[n][m]  units held now           (mutated by grant / rollback / preempt / terminate)
//! maximum[n][m]     declared maximum claim   (set once, zeroed on terminate)
//! need[n][m]        max(maximum - allocation, 0), always derived
//! available[m]      free units
//! ```
//!
//! Every mutator moves identical quantities between a process row and
//! `available`, so the column totals captured at initialization are
//! conserved for the lifetime of the state.

pub mod types;
pub mod state;

#[cfg(kani)]
pub mod proof;

// Re-exports
pub use types::*;
pub use state::{ResourceState, StateSnapshot};
