//! Safety Algorithm & Deadlock Detection
//!
//! # Algorithm
//!
//! ```text
//! work   := available
//! finish := [false; n]
//! repeat
//!     for p in 0..n (index order):
//!         if !finish[p] && need[p] <= work:
//!             work += allocation[p]; finish[p] = true; sequence.push(p)
//! until a full pass finishes nobody
//! safe := all finished
//! ```
//!
//! A process that finishes mid-pass releases its allocation immediately,
//! so later processes in the same pass see the enlarged `work`. The scan
//! deliberately does not restart from index 0 after each finish: for
//! the classic five-process example that would report `[1,3,0,2,4]`,
//! while continuing the pass reports `[1,3,4,0,2]`. The scan
//! is first-fit in index order, which makes the reported sequence
//! deterministic. Each productive pass finishes at least one process, so
//! the loop runs at most `n` passes: O(n²·m).

pub mod checker;
pub mod detector;

pub use checker::{SafetyChecker, SafetyReport};
pub use detector::{DeadlockDetector, Detection, Verdict};
