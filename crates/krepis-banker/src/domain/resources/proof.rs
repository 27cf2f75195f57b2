//! Kani Proof Harnesses for ResourceState
//!
//! Bounded to 2 processes x 2 resource types with small unit counts so
//! the solver stays tractable.

use super::*;

fn any_state() -> ResourceState {
    let cell = || {
        let v: Units = kani::any();
        kani::assume(v <= 4);
        v
    };
    let allocation = vec![vec![cell(), cell()], vec![cell(), cell()]];
    let maximum = vec![vec![cell(), cell()], vec![cell(), cell()]];
    let available = vec![cell(), cell()];
    ResourceState::initialize(2, 2, allocation, maximum, available).unwrap()
}

/// R-001 + R-003: a grant followed by its revert restores the exact state
#[kani::proof]
#[kani::unwind(4)]
fn proof_grant_revert_is_identity() {
    let mut state = any_state();
    let before = state.clone();

    let pid = ProcessId(if kani::any() { 1 } else { 0 });
    let r0: Units = kani::any();
    let r1: Units = kani::any();
    kani::assume(r0 <= state.available()[0] && r1 <= state.available()[1]);

    state.apply_grant(pid, &[r0, r1]);
    kani::assert(state.is_conserved(), "grant must conserve totals");

    state.revert_grant(pid, &[r0, r1]);
    kani::assert(state == before, "revert must restore the exact state");
}

/// R-001: terminating releases everything and stays conserved
#[kani::proof]
#[kani::unwind(4)]
fn proof_retire_conserves() {
    let mut state = any_state();
    let pid = ProcessId(if kani::any() { 1 } else { 0 });

    state.retire(pid);
    kani::assert(state.is_conserved(), "retire must conserve totals");
    kani::assert(state.total_allocation(pid) == 0, "retired row holds nothing");
    kani::assert(state.total_need(pid) == 0, "retired row needs nothing");
}

/// R-002: need is derived and never underflows
#[kani::proof]
#[kani::unwind(4)]
fn proof_need_is_clamped_difference() {
    let state = any_state();
    for i in 0..2 {
        for j in 0..2 {
            let expected = state.maximum()[i][j].saturating_sub(state.allocation()[i][j]);
            kani::assert(state.need()[i][j] == expected, "need is max(maximum - allocation, 0)");
        }
    }
}
