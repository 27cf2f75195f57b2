//! ResourceState - Banker's Matrices for One Session

use super::types::*;
use crate::domain::error::{BankerError, BankerResult};
use serde::Serialize;

/// Allocation state for `n` processes and `m` resource types
///
/// All mutation goes through crate-internal transfer methods which move
/// units between a process row and `available` in equal and opposite
/// amounts, then re-derive the affected `need` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    num_processes: usize,
    num_resources: usize,

    allocation: Vec<Vec<Units>>,
    maximum: Vec<Vec<Units>>,
    need: Vec<Vec<Units>>,
    available: Vec<Units>,

    /// Column totals captured at initialization (never modified)
    total_units: Vec<u64>,

    /// Most recent non-zero request per process
    last_request: Vec<Vec<Units>>,
    /// Lifetime request count per process (includes denied/rolled back)
    request_count: Vec<u64>,
    terminated: Vec<bool>,
}

impl ResourceState {
    /// Build a state with the default `MAX_PROCESSES` x `MAX_RESOURCES` bounds
    ///
    /// # Errors
    /// - `InvalidDimensions`: `processes` or `resources` outside `1..=10`
    /// - `ShapeMismatch`: a matrix is not `processes x resources` or
    ///   `available` is not of length `resources`
    /// - `InvalidConfig`: a column total does not fit in `Units`
    pub fn initialize(
        processes: usize,
        resources: usize,
        allocation: Vec<Vec<Units>>,
        maximum: Vec<Vec<Units>>,
        available: Vec<Units>,
    ) -> BankerResult<Self> {
        Self::initialize_bounded(
            (MAX_PROCESSES, MAX_RESOURCES),
            processes,
            resources,
            allocation,
            maximum,
            available,
        )
    }

    /// Build a state, validating dimensions against `(max_processes, max_resources)`
    ///
    /// Nothing is constructed when validation fails.
    pub fn initialize_bounded(
        (max_processes, max_resources): (usize, usize),
        processes: usize,
        resources: usize,
        allocation: Vec<Vec<Units>>,
        maximum: Vec<Vec<Units>>,
        available: Vec<Units>,
    ) -> BankerResult<Self> {
        if !(1..=max_processes).contains(&processes) || !(1..=max_resources).contains(&resources) {
            return Err(BankerError::InvalidDimensions {
                processes,
                resources,
                max_processes,
                max_resources,
            });
        }

        check_matrix("allocation", &allocation, processes, resources)?;
        check_matrix("maximum", &maximum, processes, resources)?;
        if available.len() != resources {
            return Err(BankerError::ShapeMismatch {
                what: "available".to_string(),
                expected: resources,
                actual: available.len(),
            });
        }

        let total_units = (0..resources)
            .map(|j| {
                u64::from(available[j])
                    + allocation.iter().map(|row| u64::from(row[j])).sum::<u64>()
            })
            .collect::<Vec<u64>>();
        if let Some(j) = total_units.iter().position(|&t| t > u64::from(Units::MAX)) {
            return Err(BankerError::InvalidConfig(format!(
                "resource type {j} holds {} units in total, above {}",
                total_units[j],
                Units::MAX
            )));
        }

        let mut state = Self {
            num_processes: processes,
            num_resources: resources,
            allocation,
            maximum,
            need: vec![vec![0; resources]; processes],
            available,
            total_units,
            last_request: vec![vec![0; resources]; processes],
            request_count: vec![0; processes],
            terminated: vec![false; processes],
        };
        state.recompute_need();
        Ok(state)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Derivation
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Re-derive the whole need matrix: `need = max(maximum - allocation, 0)`
    ///
    /// Over-allocation (allocation above maximum) clamps to zero rather
    /// than being reported.
    pub fn recompute_need(&mut self) {
        for i in 0..self.num_processes {
            for j in 0..self.num_resources {
                self.recompute_need_cell(i, j);
            }
        }
    }

    #[inline]
    fn recompute_need_cell(&mut self, i: usize, j: usize) {
        self.need[i][j] = self.maximum[i][j].saturating_sub(self.allocation[i][j]);
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Transfers (crate-internal; every one conserves column totals)
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Move `request` from available into `pid`'s allocation
    ///
    /// Caller guarantees `request[j] <= available[j]` for every `j`.
    pub(crate) fn apply_grant(&mut self, pid: ProcessId, request: &[Units]) {
        let i = pid.as_usize();
        for (j, &units) in request.iter().enumerate() {
            self.available[j] -= units;
            self.allocation[i][j] += units;
            self.recompute_need_cell(i, j);
        }
    }

    /// Exact inverse of [`apply_grant`](Self::apply_grant)
    pub(crate) fn revert_grant(&mut self, pid: ProcessId, request: &[Units]) {
        let i = pid.as_usize();
        for (j, &units) in request.iter().enumerate() {
            self.allocation[i][j] -= units;
            self.available[j] += units;
            self.recompute_need_cell(i, j);
        }
    }

    /// Take one unit of type `j` from `pid` back into available
    ///
    /// Returns `false` (and changes nothing) if `pid` holds none.
    pub(crate) fn reclaim_unit(&mut self, pid: ProcessId, j: usize) -> bool {
        let i = pid.as_usize();
        if self.allocation[i][j] == 0 {
            return false;
        }
        self.allocation[i][j] -= 1;
        self.available[j] += 1;
        self.recompute_need_cell(i, j);
        true
    }

    /// Release every unit `pid` holds and zero its row; returns what was released
    pub(crate) fn retire(&mut self, pid: ProcessId) -> Vec<Units> {
        let i = pid.as_usize();
        let released = std::mem::replace(&mut self.allocation[i], vec![0; self.num_resources]);
        for (slot, &units) in self.available.iter_mut().zip(&released) {
            *slot += units;
        }
        self.maximum[i].fill(0);
        self.need[i].fill(0);
        self.terminated[i] = true;
        released
    }

    /// Record an issued request against `pid`
    pub(crate) fn record_request(&mut self, pid: ProcessId, request: &[Units]) {
        let i = pid.as_usize();
        self.last_request[i].copy_from_slice(request);
        self.request_count[i] += 1;
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Queries
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Number of processes (n)
    #[inline]
    pub fn num_processes(&self) -> usize {
        self.num_processes
    }

    /// Number of resource types (m)
    #[inline]
    pub fn num_resources(&self) -> usize {
        self.num_resources
    }

    /// Check whether `pid` indexes a row of this state
    #[inline]
    pub fn contains(&self, pid: ProcessId) -> bool {
        pid.as_usize() < self.num_processes
    }

    /// Allocation matrix
    pub fn allocation(&self) -> &[Vec<Units>] {
        &self.allocation
    }

    /// Maximum-claim matrix
    pub fn maximum(&self) -> &[Vec<Units>] {
        &self.maximum
    }

    /// Need matrix
    pub fn need(&self) -> &[Vec<Units>] {
        &self.need
    }

    /// Available vector
    pub fn available(&self) -> &[Units] {
        &self.available
    }

    /// Conserved total per resource type
    pub fn total_units(&self) -> &[u64] {
        &self.total_units
    }

    /// Lifetime request count per process
    pub fn request_count(&self) -> &[u64] {
        &self.request_count
    }

    /// Most recent recorded request per process
    pub fn last_request(&self) -> &[Vec<Units>] {
        &self.last_request
    }

    /// Sum of `pid`'s allocation across all resource types
    pub fn total_allocation(&self, pid: ProcessId) -> u64 {
        self.allocation[pid.as_usize()].iter().map(|&u| u64::from(u)).sum()
    }

    /// Sum of `pid`'s remaining need across all resource types
    pub fn total_need(&self, pid: ProcessId) -> u64 {
        self.need[pid.as_usize()].iter().map(|&u| u64::from(u)).sum()
    }

    /// Check if `pid` was terminated
    pub fn is_terminated(&self, pid: ProcessId) -> bool {
        self.terminated[pid.as_usize()]
    }

    /// Classify `pid`
    pub fn process_status(&self, pid: ProcessId) -> ProcessStatus {
        if self.is_terminated(pid) {
            ProcessStatus::Terminated
        } else if self.total_need(pid) > 0 {
            ProcessStatus::Active
        } else {
            ProcessStatus::Satisfied
        }
    }

    /// Verify `available[j] + Σ_i allocation[i][j] == total_units[j]` for all `j`
    pub fn is_conserved(&self) -> bool {
        (0..self.num_resources).all(|j| {
            let held: u64 = self.allocation.iter().map(|row| u64::from(row[j])).sum();
            u64::from(self.available[j]) + held == self.total_units[j]
        })
    }

    /// Copy all matrices for reporting
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            allocation: self.allocation.clone(),
            maximum: self.maximum.clone(),
            need: self.need.clone(),
            available: self.available.clone(),
            request_count: self.request_count.clone(),
            terminated: (0..self.num_processes)
                .filter(|&i| self.terminated[i])
                .map(ProcessId)
                .collect(),
        }
    }
}

fn check_matrix(
    name: &str,
    matrix: &[Vec<Units>],
    rows: usize,
    cols: usize,
) -> BankerResult<()> {
    if matrix.len() != rows {
        return Err(BankerError::ShapeMismatch {
            what: name.to_string(),
            expected: rows,
            actual: matrix.len(),
        });
    }
    for (i, row) in matrix.iter().enumerate() {
        if row.len() != cols {
            return Err(BankerError::ShapeMismatch {
                what: format!("{name} row {i}"),
                expected: cols,
                actual: row.len(),
            });
        }
    }
    Ok(())
}

/// Point-in-time copy of the matrices, emitted once per cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// Allocation matrix
    pub allocation: Vec<Vec<Units>>,
    /// Maximum-claim matrix
    pub maximum: Vec<Vec<Units>>,
    /// Need matrix
    pub need: Vec<Vec<Units>>,
    /// Available vector
    pub available: Vec<Units>,
    /// Lifetime request count per process
    pub request_count: Vec<u64>,
    /// Processes terminated so far
    pub terminated: Vec<ProcessId>,
}
