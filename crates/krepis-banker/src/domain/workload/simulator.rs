//! WorkloadSimulator - Randomized Requests with Speculative Grants

use super::random::RandomSource;
use crate::domain::resources::{ProcessId, ResourceState, ResourceTypeId, Units};
use crate::domain::risk::PressureTracker;
use crate::domain::safety::SafetyChecker;
use serde::Serialize;
use tracing::debug;

/// Default per-type probability of asking one unit beyond declared need
pub const DEFAULT_OVERSHOOT_PROBABILITY: f64 = 0.05;

/// How a request was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// All-zero request, or addressed to a terminated process; not counted
    Discarded,
    /// Some quantity exceeded what was free; nothing changed
    Denied {
        /// First resource type that could not be covered
        resource: ResourceTypeId,
        /// Units asked for
        requested: Units,
        /// Units free at the time
        available: Units,
    },
    /// Granted speculatively, found unsafe, undone
    RolledBack,
    /// Granted and the state is still safe
    Granted,
}

/// One generated request and its fate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestRecord {
    /// Requesting process
    pub process: ProcessId,
    /// Units asked per resource type
    pub request: Vec<Units>,
    /// Result
    pub outcome: RequestOutcome,
}

/// Two-phase grant: applied on construction, then committed or rolled back
///
/// Consuming `commit`/`rollback` guarantees exactly one of the two runs.
struct SpeculativeGrant<'a> {
    state: &'a mut ResourceState,
    pid: ProcessId,
    request: &'a [Units],
}

impl<'a> SpeculativeGrant<'a> {
    fn apply(state: &'a mut ResourceState, pid: ProcessId, request: &'a [Units]) -> Self {
        state.apply_grant(pid, request);
        Self { state, pid, request }
    }

    fn is_safe(&self) -> bool {
        SafetyChecker::check(self.state).safe
    }

    fn commit(self) {}

    fn rollback(self) {
        self.state.revert_grant(self.pid, self.request);
    }
}

/// Per-cycle request generator
#[derive(Debug, Clone)]
pub struct WorkloadSimulator {
    max_requests: usize,
    overshoot_probability: f64,
}

impl Default for WorkloadSimulator {
    fn default() -> Self {
        Self::new(3, DEFAULT_OVERSHOOT_PROBABILITY)
    }
}

impl WorkloadSimulator {
    /// Create a generator issuing `1..=max_requests` requests per cycle
    ///
    /// `max_requests` is raised to at least 1.
    pub fn new(max_requests: usize, overshoot_probability: f64) -> Self {
        Self {
            max_requests: max_requests.max(1),
            overshoot_probability,
        }
    }

    /// Upper bound K on requests per cycle
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Generate and submit this cycle's requests
    pub fn run_cycle<R: RandomSource>(
        &self,
        state: &mut ResourceState,
        pressure: &mut PressureTracker,
        rng: &mut R,
    ) -> Vec<RequestRecord> {
        let count = rng.range_inclusive(1, self.max_requests as u64) as usize;
        let mut records = Vec::with_capacity(count);

        for _ in 0..count {
            let pid = ProcessId(rng.below(state.num_processes() as u64) as usize);
            let request = if state.is_terminated(pid) {
                vec![0; state.num_resources()]
            } else {
                self.draw_request(state, pid, rng)
            };
            let outcome = Self::submit(state, pressure, pid, &request);
            records.push(RequestRecord {
                process: pid,
                request,
                outcome,
            });
        }

        records
    }

    /// Draw a request vector for `pid`
    ///
    /// Each quantity is uniform in `[0, need]`, except that with
    /// probability `overshoot_probability` it is `need + 1`.
    pub fn draw_request<R: RandomSource>(
        &self,
        state: &ResourceState,
        pid: ProcessId,
        rng: &mut R,
    ) -> Vec<Units> {
        state.need()[pid.as_usize()]
            .iter()
            .map(|&need| {
                if rng.chance(self.overshoot_probability) {
                    need.saturating_add(1)
                } else {
                    rng.below(u64::from(need) + 1) as Units
                }
            })
            .collect()
    }

    /// Apply `request` from `pid` against `state`
    ///
    /// Deterministic given its inputs; the random draw happens in
    /// [`draw_request`](Self::draw_request).
    pub fn submit(
        state: &mut ResourceState,
        pressure: &mut PressureTracker,
        pid: ProcessId,
        request: &[Units],
    ) -> RequestOutcome {
        if !state.contains(pid) || state.is_terminated(pid) || request.iter().all(|&u| u == 0) {
            debug!(process = %pid, "request discarded");
            return RequestOutcome::Discarded;
        }

        state.record_request(pid, request);
        pressure.accumulate(request);

        let shortfall = request
            .iter()
            .zip(state.available())
            .position(|(&want, &free)| want > free);
        if let Some(j) = shortfall {
            let outcome = RequestOutcome::Denied {
                resource: ResourceTypeId(j),
                requested: request[j],
                available: state.available()[j],
            };
            debug!(process = %pid, ?request, resource = j, "request denied");
            return outcome;
        }

        let grant = SpeculativeGrant::apply(state, pid, request);
        if grant.is_safe() {
            grant.commit();
            debug!(process = %pid, ?request, "request granted");
            RequestOutcome::Granted
        } else {
            grant.rollback();
            debug!(process = %pid, ?request, "request rolled back");
            RequestOutcome::RolledBack
        }
    }
}
