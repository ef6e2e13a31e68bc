//! N-D chunked iterator micro-benchmark.
//!
//! Measures the cost of building and fully draining one tiling cycle for
//! grid shapes/chunk widths of practical scheduler sizes.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use radsim_core::iter::ChunkIter;

fn bench_build(c: &mut Criterion) {
    c.bench_function("chunk_iter_build_wsr88d_grid", |b| {
        b.iter(|| black_box(ChunkIter::build(black_box(&[9, 92, 1000]), black_box(5), None).unwrap()));
    });
}

fn bench_drain_one_cycle(c: &mut Criterion) {
    c.bench_function("chunk_iter_drain_one_cycle", |b| {
        b.iter(|| {
            let it = ChunkIter::build(&[9, 92, 1000], 5, None).unwrap();
            let n = it.cycle_len();
            for slice in it.take(n) {
                black_box(slice);
            }
        });
    });
}

fn bench_drain_large_grid(c: &mut Criterion) {
    c.bench_function("chunk_iter_drain_large_grid", |b| {
        b.iter(|| {
            let it = ChunkIter::build(&[40, 720, 2000], 20, None).unwrap();
            let n = it.cycle_len();
            for slice in it.take(n) {
                black_box(slice);
            }
        });
    });
}

criterion_group!(benches, bench_build, bench_drain_one_cycle, bench_drain_large_grid);
criterion_main!(benches);
