//! `Vcp`: a job that reproduces the scan pattern and timing of a WSR-88D
//! Volume Coverage Pattern, with per-cut dwell time and PRT read off the
//! current elevation index rather than stored as fixed fields.

use crate::iter::base::{single_index_axis, tiled_axis, BaseNDIter};
use crate::job::vcp_tables::VcpTable;
use crate::job::{task_duration, ScanJob};
use crate::slice::Slice;
use crate::task::{JobId, ScanOperation};
use crate::time::Duration;

/// Azimuth chunk width used by every WSR-88D VCP; matches the real RDA's
/// radial-batch granularity.
const VCP_AZIMUTH_CHUNK: usize = 5;

/// A cycling job over a WSR-88D volume coverage pattern. `elevOffset` in
/// the original implementation shifted cut elevations against a grid that
/// itself started above ground level; here that's folded into
/// `elevation_axis_size`/`elevation_offset` at construction.
#[derive(Debug)]
pub struct Vcp {
    radials: BaseNDIter,
    dwell_times: Vec<Duration>,
    prts: Vec<Duration>,
    current_cut: usize,
    t: Duration,
    u: Duration,
    next_call_count: u64,
    radial_chunk_count: usize,
}

impl Vcp {
    /// `vcp` is the conventional pattern number (21, 12, 11, 121, 31, 32).
    /// `elevation_axis_size` is the number of elevation indices in the
    /// grid this job scans over. `azimuth_width`/`range_gates` describe
    /// the grid's other two axes. `requested_update_period` is clamped up
    /// to the pattern's own cycle time if given as `Duration::ZERO`
    /// (meaning "use the pattern's native cadence").
    ///
    /// Returns `None` if `vcp` does not name a supported pattern.
    pub fn new(
        vcp: u32,
        elevation_axis_size: usize,
        azimuth_width: usize,
        range_gates: usize,
        requested_update_period: Duration,
    ) -> Option<Self> {
        let table = VcpTable::lookup(vcp)?;

        let mut dwell_times = Vec::with_capacity(table.cut_count());
        let mut prts = Vec::with_capacity(table.cut_count());
        let mut elevation_positions = Vec::with_capacity(table.cut_count());
        for cut in 0..table.cut_count() {
            let grid_elev = table.grid_indices[cut];
            if grid_elev >= elevation_axis_size {
                continue;
            }
            dwell_times.push(table.dwell_time(cut));
            prts.push(table.prt(cut));
            elevation_positions.push(grid_elev);
        }

        let elevation_axis: Vec<Slice> = elevation_positions
            .iter()
            .flat_map(|&e| single_index_axis(e, e + 1, 1, elevation_axis_size))
            .collect();

        let full_azimuth = Slice::full(azimuth_width);
        let azimuth_chunks = azimuth_width.div_ceil(VCP_AZIMUTH_CHUNK);
        let azimuth_axis = tiled_axis(&full_azimuth, VCP_AZIMUTH_CHUNK, azimuth_chunks);

        let range_axis = vec![Slice::full(range_gates)];

        let axes = vec![elevation_axis, azimuth_axis, range_axis];
        let radials = BaseNDIter::new(axes, vec![1, 0, 2], true);

        // T weights each cut's dwell time by the azimuth width, matching
        // the WSR-88D cut-time formula directly (not the generic
        // per-radial accumulation every other job uses), since every cut
        // sweeps the same full azimuth regardless of chunking.
        let t = dwell_times
            .iter()
            .fold(Duration::ZERO, |acc, &d| acc + d.saturating_mul(azimuth_width as u64));

        let u = if requested_update_period < t { t } else { requested_update_period };
        let radial_chunk_count = radials.cycle_len();

        Some(Vcp {
            radials,
            dwell_times,
            prts,
            current_cut: 0,
            t,
            u,
            next_call_count: 0,
            radial_chunk_count,
        })
    }
}

impl ScanJob for Vcp {
    fn next_operation(&mut self, id: JobId) -> ScanOperation {
        let cursor_elev = self.radials.cursor()[0];
        self.current_cut = cursor_elev;
        let slice = self.radials.next().expect("Vcp radial iterator cycles forever");
        let total = task_duration(self.dwell_times[self.current_cut], &slice);
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
        self.dwell_times[self.current_cut]
    }

    fn prt(&self) -> Duration {
        self.prts[self.current_cut]
    }

    fn loopcnt_frac(&self) -> f64 {
        self.next_call_count as f64 / self.radial_chunk_count as f64
    }

    fn reset(&mut self, radials: BaseNDIter) {
        self.radial_chunk_count = radials.cycle_len();
        self.radials = radials;
    }

    fn kind(&self) -> &'static str {
        "vcp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_vcp_number_returns_none() {
        assert!(Vcp::new(999, 9, 92, 1000, Duration::ZERO).is_none());
    }

    #[test]
    fn vcp21_dwell_and_prt_change_across_cuts() {
        let mut job = Vcp::new(21, 9, 92, 1000, Duration::ZERO).unwrap();
        let first_dwell = {
            job.next_operation(JobId(0));
            job.dwell_time()
        };
        // advance through the full azimuth of the first cut to reach the next one
        let azimuth_chunks = 92usize.div_ceil(VCP_AZIMUTH_CHUNK);
        for _ in 1..azimuth_chunks {
            job.next_operation(JobId(0));
        }
        job.next_operation(JobId(0));
        let later_dwell = job.dwell_time();
        assert_ne!(first_dwell, later_dwell);
    }

    #[test]
    fn u_clamps_to_t_when_requested_is_zero() {
        let job = Vcp::new(31, 9, 92, 1000, Duration::ZERO).unwrap();
        assert_eq!(job.u(), job.t());
    }

    #[test]
    fn elevations_beyond_grid_are_skipped() {
        // VCP21 needs grid indices up to 8; a 3-elevation grid should
        // drop every cut referencing index >= 3.
        let job = Vcp::new(21, 3, 92, 1000, Duration::ZERO).unwrap();
        assert!(job.dwell_times.len() < 11);
    }
}
