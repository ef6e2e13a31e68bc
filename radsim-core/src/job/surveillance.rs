//! `Surveillance`: a single-elevation (or fixed small set of elevations)
//! sweep over the full azimuth circle, tiled in azimuth for scheduling
//! granularity but always completing a full `T == U` cycle.

use crate::iter::base::{single_index_axis, tiled_axis, BaseNDIter};
use crate::job::{cycle_total_duration, task_duration, ScanJob};
use crate::slice::Slice;
use crate::task::{JobId, ScanOperation};
use crate::time::Duration;

/// A full-circle sweep at one or more fixed elevation cuts, with the
/// azimuth axis chunked into `azimuth_chunk`-wide groups for scheduling
/// granularity. Because every azimuth chunk must be visited once per
/// elevation to complete a cycle, `U == T` always, independent of
/// `azimuth_chunk` — chunking only affects how finely the scheduler can
/// interleave this job with others.
#[derive(Debug)]
pub struct Surveillance {
    radials: BaseNDIter,
    dwell_time: Duration,
    prt: Duration,
    t: Duration,
    next_call_count: u64,
    radial_chunk_count: usize,
}

impl Surveillance {
    /// `elevations` are the fixed elevation indices visited every cycle, in
    /// the order given (elevation is the outer cycle axis; azimuth chunks
    /// are innermost, so a full azimuth sweep completes before moving to
    /// the next elevation). `range_gates` is the full range-gate axis
    /// length; it is never subdivided.
    pub fn new(
        elevations: &[usize],
        elevation_axis_size: usize,
        azimuth_width: usize,
        azimuth_chunk: usize,
        range_gates: usize,
        dwell_time: Duration,
        prt: Duration,
    ) -> Self {
        debug_assert!(!elevations.is_empty());
        debug_assert!(azimuth_chunk > 0);

        let elevation_axis: Vec<Slice> = elevations
            .iter()
            .flat_map(|&e| single_index_axis(e, e + 1, 1, elevation_axis_size))
            .collect();

        let full_azimuth = Slice::full(azimuth_width);
        let azimuth_chunks = azimuth_width.div_ceil(azimuth_chunk);
        let azimuth_axis = tiled_axis(&full_azimuth, azimuth_chunk, azimuth_chunks);

        let range_axis = vec![Slice::full(range_gates)];

        let axes = vec![elevation_axis, azimuth_axis, range_axis];
        // azimuth (1) innermost: sweep the full circle before stepping elevation.
        let radials = BaseNDIter::new(axes, vec![1, 0, 2], true);

        let radial_chunk_count = radials.cycle_len();
        let t = cycle_total_duration(&radials, dwell_time);

        Surveillance {
            radials,
            dwell_time,
            prt,
            t,
            next_call_count: 0,
            radial_chunk_count,
        }
    }
}

impl ScanJob for Surveillance {
    fn next_operation(&mut self, id: JobId) -> ScanOperation {
        let slice = self.radials.next().expect("Surveillance radial iterator cycles forever");
        let total = task_duration(self.dwell_time, &slice);
        self.next_call_count += 1;
        ScanOperation::with_duty_cycle(id, slice, total)
    }

    fn t(&self) -> Duration {
        self.t
    }

    fn u(&self) -> Duration {
        // A surveillance scan has no concept of revisiting part of the
        // volume early: every cycle is a full update.
        self.t
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
        "surveillance"
    }
}
