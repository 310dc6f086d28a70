//! Criterion benchmarks for full diffusion runs.
//!
//! Compares the sequential schedule against the chunked schedule at a
//! few chunk sizes on the reference profile.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mcell_bench::reference_profile;
use mcell_engine::DiffusionSchedule;

/// Benchmark: 10 iterations of the reference profile, per schedule.
fn bench_schedules(c: &mut Criterion) {
    let mut group = c.benchmark_group("diffusion_10_iterations");
    group.sample_size(20);

    let schedules = [
        ("sequential", DiffusionSchedule::Sequential),
        ("chunked_256", DiffusionSchedule::Chunked { chunk_size: 256 }),
        ("chunked_4096", DiffusionSchedule::Chunked { chunk_size: 4096 }),
    ];
    for (label, schedule) in schedules {
        group.bench_with_input(BenchmarkId::from_parameter(label), &schedule, |b, &s| {
            b.iter_batched(
                || reference_profile(42, 10, s),
                |mut sim| {
                    let report = sim.run().unwrap();
                    black_box(report.metrics.instance_moves);
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

/// Benchmark: a single iteration, to isolate per-iteration overhead.
fn bench_single_iteration(c: &mut Criterion) {
    c.bench_function("diffusion_single_iteration_sequential", |b| {
        b.iter_batched(
            || reference_profile(7, 1, DiffusionSchedule::Sequential),
            |mut sim| black_box(sim.run().unwrap()),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_schedules, bench_single_iteration);
criterion_main!(benches);
