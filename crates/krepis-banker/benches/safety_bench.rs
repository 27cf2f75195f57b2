//! Safety Check Benchmark Suite
//!
//! # Scenarios
//!
//! 1. **Classic**: 5 processes x 3 resource types, safe
//! 2. **Worst-case order**: processes can only finish in reverse index
//!    order, so every pass admits exactly one process
//! 3. **Full cycle**: request generation + detection + resolution

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use krepis_banker::domain::{
    Continuation, ResourceState, SafetyChecker, Scenario, SimulationBuilder, SimulationConfig,
};

/// Every process holds one unit and nothing is free; only the last
/// process has zero need, and each finish frees the one unit that lets
/// the next lower index finish
fn reverse_chain(n: usize) -> ResourceState {
    let allocation: Vec<Vec<u32>> = (0..n).map(|_| vec![1]).collect();
    let maximum: Vec<Vec<u32>> = (0..n).map(|i| vec![(n - i) as u32]).collect();
    ResourceState::initialize_bounded((n, 1), n, 1, allocation, maximum, vec![0])
        .expect("valid chain")
}

fn bench_classic(c: &mut Criterion) {
    let state = Scenario::classic()
        .into_state(&SimulationConfig::default())
        .expect("classic scenario");

    c.bench_function("safety/classic", |b| {
        b.iter(|| black_box(SafetyChecker::check(black_box(&state))))
    });
}

fn bench_reverse_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("safety/reverse_chain");
    for n in [4usize, 8, 10, 32] {
        let state = reverse_chain(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &state, |b, state| {
            b.iter(|| black_box(SafetyChecker::check(state)))
        });
    }
    group.finish();
}

fn bench_cycles(c: &mut Criterion) {
    c.bench_function("engine/100_cycles", |b| {
        b.iter(|| {
            let mut engine = SimulationBuilder::new()
                .seed(0xBEEF)
                .build(Scenario::classic())
                .expect("engine");
            black_box(engine.run(100, |_| Continuation::Continue))
        })
    });
}

criterion_group!(benches, bench_classic, bench_reverse_chain, bench_cycles);
criterion_main!(benches);
