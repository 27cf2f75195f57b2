//! Deadlock Risk Heuristic
//!
//! # Model
//!
//! ```text
//! demand_ratio   = clamp(Σneed / (Σavailable + 1), 0, 5) / 5
//! pressure_ratio = clamp(Σpressure / (n + 1), 0, 5) / 5
//! concurrency    = active / n
//! probability    = clamp(0.6·demand + 0.25·pressure + 0.15·concurrency, 0, 1)
//! ```
//!
//! A fixed linear score, not a calibrated model. The `+1` denominators
//! keep it total over degenerate states.

pub mod predictor;
pub mod pressure;

pub use predictor::{RiskAssessment, RiskLevel, RiskPredictor, RiskThresholds};
pub use pressure::PressureTracker;
