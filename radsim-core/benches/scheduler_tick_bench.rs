//! `TaskScheduler` tick micro-benchmark.
//!
//! Measures the cost of one `next_jobs` + `increment_timer` pass over a
//! slot pool kept continuously busy, the steady-state loop a driver runs
//! every simulated frame.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use radsim_core::iter::ChunkIter;
use radsim_core::job::StaticJob;
use radsim_core::scheduler::TaskScheduler;
use radsim_core::time::Duration;

fn make_job() -> Box<dyn radsim_core::job::ScanJob> {
    let radials = ChunkIter::build(&[9, 92, 1000], 5, None).unwrap();
    Box::new(StaticJob::new(radials, Duration::from_micros(64_000), Duration::from_micros(800), Duration::ZERO))
}

fn seeded_scheduler(concurrent_max: usize, job_count: usize) -> TaskScheduler {
    let mut sched = TaskScheduler::new(concurrent_max, 100);
    let jobs: Vec<_> = (0..job_count).map(|_| make_job()).collect();
    sched.add_jobs(jobs);
    sched
}

fn bench_increment_timer(c: &mut Criterion) {
    let mut sched = seeded_scheduler(8, 32);
    sched.next_jobs(false);
    c.bench_function("scheduler_increment_timer_tick", |b| {
        b.iter(|| {
            sched.increment_timer(black_box(Duration::from_micros(1_000)));
            sched.next_jobs(false);
        });
    });
}

fn bench_next_jobs_refill(c: &mut Criterion) {
    c.bench_function("scheduler_next_jobs_cold_refill", |b| {
        b.iter(|| {
            let mut sched = seeded_scheduler(16, 64);
            sched.next_jobs(black_box(false));
            black_box(&sched);
        });
    });
}

criterion_group!(benches, bench_increment_timer, bench_next_jobs_refill);
criterion_main!(benches);
