//! Criterion benchmarks for stepping a dycore through its instance.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use floe_bench::{null_instance, REFERENCE_GRID};
use floe_dycore::DyCoreInstance;
use floe_test_utils::{GridFixture, RecordingDyCore};

/// Benchmark: one pass-through step.
fn bench_null_step(c: &mut Criterion) {
    let mut instance = null_instance();
    let mut time = 0.0;
    c.bench_function("null_step", |b| {
        b.iter(|| {
            instance.run_dycore(&mut time, black_box(1.0)).unwrap();
        });
    });
}

/// Benchmark: a step that copies two 30K-cell output fields.
fn bench_recording_step_30k(c: &mut Criterion) {
    let (ewn, nsn) = REFERENCE_GRID;
    let mut grid = GridFixture::new(ewn, nsn);
    let core = RecordingDyCore::new("recording", grid.dims(), 1.0);
    let mut instance = DyCoreInstance::new(1, Box::new(core));
    grid.attach(instance.registry_mut()).unwrap();
    instance.init_dycore("bench.config").unwrap();
    let mut time = 0.0;
    c.bench_function("recording_step_30k", |b| {
        b.iter(|| {
            instance.run_dycore(&mut time, black_box(1.0)).unwrap();
        });
    });
}

criterion_group!(benches, bench_null_step, bench_recording_step_30k);
criterion_main!(benches);
