//! RiskPredictor - Proximity-to-Deadlock Score

use super::pressure::PressureTracker;
use crate::domain::resources::{ProcessId, ResourceState};
use serde::{Deserialize, Serialize};
use std::fmt;

const DEMAND_WEIGHT: f64 = 0.6;
const PRESSURE_WEIGHT: f64 = 0.25;
const CONCURRENCY_WEIGHT: f64 = 0.15;

/// Ratios are clamped to this ceiling before normalization
const RATIO_CEILING: f64 = 5.0;

/// Band edges for [`RiskLevel`]; a probability strictly above an edge
/// falls into that band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Lower edge of `Critical`
    pub critical: f64,
    /// Lower edge of `High`
    pub high: f64,
    /// Lower edge of `Moderate`
    pub moderate: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 0.8,
            high: 0.6,
            moderate: 0.4,
        }
    }
}

/// Textual risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// At or below the moderate edge
    Low,
    /// Above moderate
    Moderate,
    /// Above high
    High,
    /// Above critical
    Critical,
}

impl RiskLevel {
    /// Classify `probability` against `thresholds`
    pub fn classify(probability: f64, thresholds: &RiskThresholds) -> Self {
        if probability > thresholds.critical {
            Self::Critical
        } else if probability > thresholds.high {
            Self::High
        } else if probability > thresholds.moderate {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk score plus the components it was built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Weighted score in `[0, 1]`
    pub probability: f64,
    /// Normalized outstanding-need vs. free-units ratio
    pub demand_ratio: f64,
    /// Normalized pressure per process
    pub pressure_ratio: f64,
    /// Share of processes with outstanding need
    pub concurrency: f64,
    /// Band the probability falls into
    pub level: RiskLevel,
}

/// Linear deadlock-risk heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskPredictor {
    thresholds: RiskThresholds,
}

impl RiskPredictor {
    /// Create a predictor classifying with `thresholds`
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// Band edges in use
    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Score `state` given the current `pressure`
    pub fn predict(&self, state: &ResourceState, pressure: &PressureTracker) -> RiskAssessment {
        let n = state.num_processes();

        let total_need: u64 = state.need().iter().flatten().map(|&u| u64::from(u)).sum();
        let total_available: u64 = state.available().iter().map(|&u| u64::from(u)).sum();
        let active = (0..n)
            .filter(|&i| state.total_need(ProcessId(i)) > 0)
            .count();

        let demand_ratio = normalize(total_need as f64 / (total_available as f64 + 1.0));
        let pressure_ratio = normalize(pressure.total() as f64 / (n as f64 + 1.0));
        let concurrency = active as f64 / n.max(1) as f64;

        let probability = (DEMAND_WEIGHT * demand_ratio
            + PRESSURE_WEIGHT * pressure_ratio
            + CONCURRENCY_WEIGHT * concurrency)
            .clamp(0.0, 1.0);

        RiskAssessment {
            probability,
            demand_ratio,
            pressure_ratio,
            concurrency,
            level: RiskLevel::classify(probability, &self.thresholds),
        }
    }
}

#[inline]
fn normalize(ratio: f64) -> f64 {
    ratio.clamp(0.0, RATIO_CEILING) / RATIO_CEILING
}
