//! Stochastic Workload Generation
//!
//! # Request Lifecycle
//!
//! ```text
//! draw ──► all zero? ──► Discarded
//!   │
//!   ▼
//! record (counter + pressure, unconditionally)
//!   │
//!   ▼
//! exceeds available? ──► Denied (no state change)
//!   │
//!   ▼
//! apply grant ──► safety check ──► unsafe ──► rollback ──► RolledBack
//!                                    │
//!                                    └─ safe ──► commit ──► Granted
//! ```
//!
//! The grant is applied and either committed or rolled back inside a
//! single call, so no other component ever observes a half-applied
//! request.

pub mod random;
pub mod simulator;

pub use random::{RandomSource, Xorshift64Star};
pub use simulator::{RequestOutcome, RequestRecord, WorkloadSimulator};
