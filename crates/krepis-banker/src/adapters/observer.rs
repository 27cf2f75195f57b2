//! Cycle Observers
//!
//! ```text
//! SimulationEngine::run_observed
//!        │  &CycleReport
//!        ▼
//! ┌──────────────────┬──────────────────┬───────────────────┐
//! │ TracingObserver  │ CollectingObserver│ JsonLinesObserver │
//! │ info!/warn!      │ Vec<CycleReport>  │ one JSON per line │
//! └──────────────────┴──────────────────┴───────────────────┘
//! ```

use crate::domain::{CycleObserver, CycleReport, RequestOutcome, Resolution, RiskLevel};
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// Logs every cycle through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CycleObserver for TracingObserver {
    fn on_cycle(&mut self, report: &CycleReport) {
        for record in &report.requests {
            match record.outcome {
                RequestOutcome::Granted => {
                    debug!(cycle = report.cycle, process = %record.process, request = ?record.request, "granted")
                }
                RequestOutcome::RolledBack => {
                    debug!(cycle = report.cycle, process = %record.process, request = ?record.request, "rolled back (unsafe)")
                }
                RequestOutcome::Denied { resource, requested, available } => debug!(
                    cycle = report.cycle,
                    process = %record.process,
                    %resource,
                    requested,
                    available,
                    "denied"
                ),
                RequestOutcome::Discarded => {}
            }
        }

        let risk = &report.risk;
        if risk.level >= RiskLevel::High {
            warn!(
                cycle = report.cycle,
                probability = risk.probability,
                level = %risk.level,
                "deadlock risk elevated"
            );
        }

        match &report.resolution {
            Resolution::NotNeeded => info!(
                cycle = report.cycle,
                verdict = %report.detection.verdict,
                probability = risk.probability,
                "cycle complete"
            ),
            Resolution::Applied { trigger, actions, safe_after } => warn!(
                cycle = report.cycle,
                verdict = %report.detection.verdict,
                ?trigger,
                ?actions,
                safe_after,
                "resolution applied"
            ),
            Resolution::NoVictim { trigger } => warn!(
                cycle = report.cycle,
                verdict = %report.detection.verdict,
                ?trigger,
                "no victim available"
            ),
        }
    }
}

/// Keeps every report in memory
#[derive(Debug, Clone, Default)]
pub struct CollectingObserver {
    reports: Vec<CycleReport>,
}

impl CollectingObserver {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports seen so far, in cycle order
    pub fn reports(&self) -> &[CycleReport] {
        &self.reports
    }

    /// Take ownership of the collected reports
    pub fn into_reports(self) -> Vec<CycleReport> {
        self.reports
    }
}

impl CycleObserver for CollectingObserver {
    fn on_cycle(&mut self, report: &CycleReport) {
        self.reports.push(report.clone());
    }
}

/// Writes each report as one JSON line
///
/// The first write error is kept and later reports are dropped; check
/// [`finish`](Self::finish) after the run.
pub struct JsonLinesObserver<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesObserver<W> {
    /// Wrap `writer`
    pub fn new(writer: W) -> Self {
        Self { writer, error: None }
    }

    /// Flush and return the writer, or the first error hit
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_report(&mut self, report: &CycleReport) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")
    }
}

impl<W: Write> CycleObserver for JsonLinesObserver<W> {
    fn on_cycle(&mut self, report: &CycleReport) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.write_report(report) {
            warn!(cycle = report.cycle, error = %err, "failed to write cycle report");
            self.error = Some(err);
        }
    }
}
