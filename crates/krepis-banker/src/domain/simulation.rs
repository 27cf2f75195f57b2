//! Simulation Engine - The Cycle Assembly
//!
//! # Cycle
//!
//! ```text
//! SimulationEngine<R>
//!   ├─ requests  : WorkloadSimulator::run_cycle   (skipped after a Delay)
//!   ├─ need      : ResourceState::recompute_need
//!   ├─ risk      : RiskPredictor::predict
//!   ├─ verdict   : DeadlockDetector::detect
//!   ├─ resolve   : ResolutionPolicy::resolve
//!   └─ decay     : PressureTracker::decay
//! ```
//!
//! # Ownership Model
//!
//! The engine owns the state, the pressure tracker and the random
//! source directly; components receive borrows for the duration of one
//! step. Everything runs on the caller's thread.

use crate::domain::config::SimulationConfig;
use crate::domain::error::BankerResult;
use crate::domain::resolution::{Resolution, ResolutionAction, ResolutionPolicy};
use crate::domain::resources::{ProcessId, ResourceState, StateSnapshot};
use crate::domain::risk::{PressureTracker, RiskAssessment, RiskLevel, RiskPredictor, RiskThresholds};
use crate::domain::safety::{DeadlockDetector, Detection};
use crate::domain::scenario::Scenario;
use crate::domain::workload::{RandomSource, RequestOutcome, RequestRecord, WorkloadSimulator, Xorshift64Star};
use serde::Serialize;
use tracing::info;

/// Caller's decision between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Run the next cycle
    Continue,
    /// Stop the run
    Stop,
}

/// Everything one cycle produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    /// `true` when requests were held back by the previous cycle's Delay
    pub deferred: bool,
    /// Requests issued this cycle
    pub requests: Vec<RequestRecord>,
    /// Risk computed after the requests
    pub risk: RiskAssessment,
    /// Verdict computed after the requests
    pub detection: Detection,
    /// Corrective action taken
    pub resolution: Resolution,
    /// Pressure after decay
    pub pressure: Vec<u64>,
    /// Matrices at the end of the cycle
    pub state: StateSnapshot,
}

/// Totals over a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    /// Cycles executed
    pub cycles: u64,
    /// Requests granted
    pub granted: u64,
    /// Requests denied for lack of free units
    pub denied: u64,
    /// Requests granted then rolled back as unsafe
    pub rolled_back: u64,
    /// All-zero requests dropped
    pub discarded: u64,
    /// Cycles classified `DEADLOCKED`
    pub deadlocked_cycles: u64,
    /// Units reclaimed by preemption
    pub preempted_units: u64,
    /// Processes terminated
    pub terminations: u64,
    /// Delay actions taken
    pub delays: u64,
    /// Cycles where action was warranted but no victim existed
    pub no_victim: u64,
    /// Highest risk level observed
    pub peak_risk: Option<RiskLevel>,
    /// Matrices after the last cycle
    pub final_state: Option<StateSnapshot>,
}

impl SimulationSummary {
    fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        for record in &report.requests {
            match record.outcome {
                RequestOutcome::Granted => self.granted += 1,
                RequestOutcome::Denied { .. } => self.denied += 1,
                RequestOutcome::RolledBack => self.rolled_back += 1,
                RequestOutcome::Discarded => self.discarded += 1,
            }
        }
        if report.detection.is_deadlocked() {
            self.deadlocked_cycles += 1;
        }
        if let Resolution::NoVictim { .. } = report.resolution {
            self.no_victim += 1;
        }
        for action in report.resolution.actions() {
            match action {
                ResolutionAction::Preempt { units, .. } => self.preempted_units += u64::from(*units),
                ResolutionAction::Terminate { .. } => self.terminations += 1,
                ResolutionAction::Delay => self.delays += 1,
            }
        }
        self.peak_risk = self.peak_risk.max(Some(report.risk.level));
        self.final_state = Some(report.state.clone());
    }
}

/// Receives every cycle report
pub trait CycleObserver {
    /// Called once per completed cycle
    fn on_cycle(&mut self, report: &CycleReport);
}

/// Top-level simulation controller
pub struct SimulationEngine<R: RandomSource> {
    config: SimulationConfig,
    state: ResourceState,
    pressure: PressureTracker,
    workload: WorkloadSimulator,
    predictor: RiskPredictor,
    rng: R,
    cycle: u64,
    defer_next: bool,
}

impl<R: RandomSource> SimulationEngine<R> {
    /// Assemble an engine from validated parts
    pub fn new(config: SimulationConfig, state: ResourceState, rng: R) -> Self {
        let pressure = PressureTracker::new(state.num_resources());
        let workload = WorkloadSimulator::new(config.max_requests_per_cycle, config.overshoot_probability);
        let predictor = RiskPredictor::new(config.thresholds);
        Self {
            config,
            state,
            pressure,
            workload,
            predictor,
            rng,
            cycle: 0,
            defer_next: false,
        }
    }

    /// Current resource state
    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// Current pressure accumulators
    pub fn pressure(&self) -> &PressureTracker {
        &self.pressure
    }

    /// Configuration in effect
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Cycles completed so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Check if the next cycle will skip request generation
    pub fn is_deferred(&self) -> bool {
        self.defer_next
    }

    /// Risk thresholds in effect
    pub fn thresholds(&self) -> &RiskThresholds {
        self.predictor.thresholds()
    }

    /// Run one full cycle
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;

        let deferred = std::mem::take(&mut self.defer_next);
        let requests = if deferred {
            info!(cycle = self.cycle, "requests deferred this cycle");
            Vec::new()
        } else {
            self.workload
                .run_cycle(&mut self.state, &mut self.pressure, &mut self.rng)
        };
        self.state.recompute_need();

        let risk = self.predictor.predict(&self.state, &self.pressure);
        let detection = DeadlockDetector::detect(&self.state);

        let resolution = ResolutionPolicy::resolve(
            &mut self.state,
            &detection,
            &risk,
            self.predictor.thresholds(),
        );
        self.defer_next = resolution.is_delay();

        self.pressure.decay();

        CycleReport {
            cycle: self.cycle,
            deferred,
            requests,
            risk,
            detection,
            resolution,
            pressure: self.pressure.values().to_vec(),
            state: self.state.snapshot(),
        }
    }

    /// Run up to `cycles` cycles, asking `decide` between cycles
    pub fn run<F>(&mut self, cycles: u64, decide: F) -> SimulationSummary
    where
        F: FnMut(&CycleReport) -> Continuation,
    {
        self.run_observed(cycles, &mut NullObserver, decide)
    }

    /// Like [`run`](Self::run), also feeding every report to `observer`
    pub fn run_observed<O, F>(&mut self, cycles: u64, observer: &mut O, mut decide: F) -> SimulationSummary
    where
        O: CycleObserver + ?Sized,
        F: FnMut(&CycleReport) -> Continuation,
    {
        let mut summary = SimulationSummary::default();
        for n in 1..=cycles {
            let report = self.run_cycle();
            observer.on_cycle(&report);
            summary.absorb(&report);

            if n < cycles && decide(&report) == Continuation::Stop {
                info!(cycle = report.cycle, "run stopped by caller");
                break;
            }
        }
        if summary.final_state.is_none() {
            summary.final_state = Some(self.state.snapshot());
        }
        summary
    }

    /// Processes terminated so far
    pub fn terminated(&self) -> Vec<ProcessId> {
        self.state.snapshot().terminated
    }
}

struct NullObserver;

impl CycleObserver for NullObserver {
    fn on_cycle(&mut self, _report: &CycleReport) {}
}

/// Builder for [`SimulationEngine`]
///
/// Defaults come from [`SimulationConfig::default`].
///
/// ```rust
/// use krepis_banker::domain::{Scenario, SimulationBuilder};
///
/// let engine = SimulationBuilder::new()
///     .seed(42)
///     .max_requests_per_cycle(4)
///     .build(Scenario::classic())
///     .unwrap();
/// assert_eq!(engine.cycle(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    config: SimulationConfig,
}

impl SimulationBuilder {
    /// Create new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set K, the per-cycle request bound
    pub fn max_requests_per_cycle(mut self, max: usize) -> Self {
        self.config.max_requests_per_cycle = max;
        self
    }

    /// Set the greedy-request probability
    pub fn overshoot_probability(mut self, p: f64) -> Self {
        self.config.overshoot_probability = p;
        self
    }

    /// Set the risk band edges
    pub fn thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Set the dimension bounds
    pub fn bounds(mut self, max_processes: usize, max_resources: usize) -> Self {
        self.config.max_processes = max_processes;
        self.config.max_resources = max_resources;
        self
    }

    /// Build with the default xorshift64* source seeded from the config
    ///
    /// # Errors
    /// Configuration or scenario validation failures; nothing is built.
    pub fn build(self, scenario: Scenario) -> BankerResult<SimulationEngine<Xorshift64Star>> {
        let rng = Xorshift64Star::new(self.config.seed);
        self.build_with_rng(scenario, rng)
    }

    /// Build with an injected random source
    pub fn build_with_rng<R: RandomSource>(
        self,
        scenario: Scenario,
        rng: R,
    ) -> BankerResult<SimulationEngine<R>> {
        self.config.validate()?;
        let state = scenario.into_state(&self.config)?;
        Ok(SimulationEngine::new(self.config, state, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(seed: u64) -> SimulationEngine<Xorshift64Star> {
        SimulationBuilder::new()
            .seed(seed)
            .build(Scenario::classic())
            .unwrap()
    }

    #[test]
    fn test_cycle_numbers_advance() {
        let mut sim = engine(1);
        assert_eq!(sim.run_cycle().cycle, 1);
        assert_eq!(sim.run_cycle().cycle, 2);
        assert_eq!(sim.cycle(), 2);
    }

    #[test]
    fn test_conservation_across_cycles() {
        let mut sim = engine(3);
        for _ in 0..100 {
            sim.run_cycle();
            assert!(sim.state().is_conserved());
        }
    }

    #[test]
    fn test_report_snapshot_matches_engine_state() {
        let mut sim = engine(5);
        let report = sim.run_cycle();
        assert_eq!(report.state, sim.state().snapshot());
        assert_eq!(report.pressure, sim.pressure().values());
        let max = report.requests.len();
        assert!((1..=3).contains(&max));
    }

    #[test]
    fn test_stop_ends_run_early() {
        let mut sim = engine(8);
        let summary = sim.run(10, |report| {
            if report.cycle == 3 {
                Continuation::Stop
            } else {
                Continuation::Continue
            }
        });
        assert_eq!(summary.cycles, 3);
        assert_eq!(sim.cycle(), 3);
    }

    #[test]
    fn test_zero_cycles_still_reports_state() {
        let mut sim = engine(8);
        let summary = sim.run(0, |_| Continuation::Continue);
        assert_eq!(summary.cycles, 0);
        assert_eq!(summary.final_state, Some(sim.state().snapshot()));
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = engine(77);
        let mut b = engine(77);
        for _ in 0..20 {
            assert_eq!(a.run_cycle(), b.run_cycle());
        }
    }

    #[test]
    fn test_delay_defers_next_cycle() {
        // Tiny thresholds force a Delay on the first safe cycle
        let thresholds = RiskThresholds {
            critical: 1.0,
            high: 0.0,
            moderate: 0.0,
        };
        let mut sim = SimulationBuilder::new()
            .seed(4)
            .thresholds(thresholds)
            .build(Scenario::classic())
            .unwrap();

        let first = sim.run_cycle();
        assert!(!first.detection.is_deadlocked() && first.risk.probability > 0.0);
        assert!(first.resolution.is_delay());
        assert!(sim.is_deferred());

        let second = sim.run_cycle();
        assert!(second.deferred);
        assert!(second.requests.is_empty());
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        let err = SimulationBuilder::new()
            .max_requests_per_cycle(0)
            .build(Scenario::classic())
            .err()
            .unwrap();
        assert!(err.is_configuration_error());
    }

    struct Counting(u64);

    impl CycleObserver for Counting {
        fn on_cycle(&mut self, _report: &CycleReport) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_observer_sees_every_cycle() {
        let mut sim = engine(12);
        let mut counter = Counting(0);
        let summary = sim.run_observed(6, &mut counter, |_| Continuation::Continue);
        assert_eq!(counter.0, 6);
        assert_eq!(summary.cycles, 6);
        let requests = summary.granted + summary.denied + summary.rolled_back + summary.discarded;
        assert!(requests >= 6);
    }
}
