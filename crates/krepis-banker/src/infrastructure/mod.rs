//! Infrastructure Layer - Documents on Disk
//!
//! Concrete loaders that depend on the filesystem and `serde_json`.
//!
//! # Responsibilities
//! - Scenario documents (initial matrices)
//! - Configuration documents (bounds, seed, thresholds)

pub mod documents;

// Re-exports
pub use documents::{load_config, load_scenario, save_scenario};
