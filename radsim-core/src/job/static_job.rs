//! `StaticJob`: a fixed focused region, usually one `ChunkIter` cycle over
//! a detected feature.

use crate::iter::BaseNDIter;
use crate::job::{cycle_total_duration, task_duration, ScanJob};
use crate::task::{JobId, ScanOperation};
use crate::time::Duration;

/// A job whose radial iterator cycles forever over a fixed partitioning of
/// a focused region, at a constant dwell time.
#[derive(Debug)]
pub struct StaticJob {
    radials: BaseNDIter,
    dwell_time: Duration,
    prt: Duration,
    t: Duration,
    u: Duration,
    next_call_count: u64,
    radial_chunk_count: usize,
}

impl StaticJob {
    /// `radials` is typically a [`crate::iter::ChunkIter`] cycle over a
    /// detected feature's bounding box. `requested_update_period` is
    /// clamped up to `T` if it would otherwise violate `U >= T`.
    pub fn new(radials: BaseNDIter, dwell_time: Duration, prt: Duration, requested_update_period: Duration) -> Self {
        let radial_chunk_count = radials.cycle_len();
        let t = cycle_total_duration(&radials, dwell_time);
        let u = if requested_update_period < t {
            tracing::warn!(
                requested_us = requested_update_period.as_micros(),
                clamped_to_us = t.as_micros(),
                "update period below one full cycle; clamping up to T"
            );
            t
        } else {
            requested_update_period
        };

        StaticJob {
            radials,
            dwell_time,
            prt,
            t,
            u,
            next_call_count: 0,
            radial_chunk_count,
        }
    }
}

impl ScanJob for StaticJob {
    fn next_operation(&mut self, id: JobId) -> ScanOperation {
        let slice = self.radials.next().expect("StaticJob radial iterator cycles forever");
        let total = task_duration(self.dwell_time, &slice);
        self.next_call_count += 1;
        ScanOperation::with_duty_cycle(id, slice, total)
    }

    fn t(&self) -> Duration {
        self.t
    }

    fn u(&self) -> Duration {
        self.u
    }

    fn dwell_time(&self) -> Duration {
        self.dwell_time
    }

    fn prt(&self) -> Duration {
        self.prt
    }

    fn loopcnt_frac(&self) -> f64 {
        self.next_call_count as f64 / self.radial_chunk_count as f64
    }

    fn reset(&mut self, radials: BaseNDIter) {
        self.radial_chunk_count = radials.cycle_len();
        self.radials = radials;
    }

    fn kind(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::ChunkIter;

    fn job(update_period: Duration) -> StaticJob {
        let radials = ChunkIter::build(&[40, 5, 1000], 20, None).unwrap();
        StaticJob::new(radials, Duration::from_micros(1000), Duration::from_micros(800), update_period)
    }

    #[test]
    fn u_clamps_up_to_t() {
        let j = job(Duration::ZERO);
        assert!(j.u() >= j.t());
        assert_eq!(j.u(), j.t());
    }

    #[test]
    fn u_preserves_requested_when_above_t() {
        let j = job(Duration::from_micros(u64::MAX / 2));
        assert_eq!(j.u().as_micros(), u64::MAX / 2);
    }

    #[test]
    fn loopcnt_frac_monotonic_and_cycles() {
        let mut j = job(Duration::ZERO);
        let mut prev = 0.0;
        for _ in 0..4 {
            j.next_operation(JobId(0));
            assert!(j.loopcnt_frac() >= prev);
            prev = j.loopcnt_frac();
        }
        assert_eq!(prev, 2.0);
    }

    #[test]
    fn reset_preserves_next_call_count() {
        let mut j = job(Duration::ZERO);
        j.next_operation(JobId(0));
        j.next_operation(JobId(0));
        let before = j.next_call_count;
        let new_radials = ChunkIter::build(&[40, 5, 1000], 20, None).unwrap();
        j.reset(new_radials);
        assert_eq!(j.next_call_count, before);
    }
}
