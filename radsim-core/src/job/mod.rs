//! The `ScanJob` family: `StaticJob`, `Surveillance`, `Vcp`.
//!
//! A job is an iterator of [`ScanOperation`]s plus the bookkeeping needed
//! to report quality-of-service metrics back to the scheduler. Dwell time
//! and PRT are modeled as *properties* (plain methods) rather than stored
//! fields so that [`Vcp`] can compute them from its current cut without any
//! special-casing in the scheduler.

mod static_job;
mod surveillance;
mod vcp;
pub mod vcp_tables;

pub use static_job::StaticJob;
pub use surveillance::Surveillance;
pub use vcp::Vcp;

use crate::iter::BaseNDIter;
use crate::slice::SliceTuple;
use crate::task::{JobId, ScanOperation};
use crate::time::Duration;

/// Shared capability set over the job family (§9 design note: "polymorphic
/// job family"). Implemented as a trait over boxed jobs rather than a
/// closed enum so a user-defined job can be registered with the scheduler.
pub trait ScanJob: std::fmt::Debug {
    /// Produce the next `ScanOperation`, incrementing `next_call_count`.
    /// `id` is supplied by the scheduler at call time (jobs do not know
    /// their own identity).
    fn next_operation(&mut self, id: JobId) -> ScanOperation;

    /// Time to complete one full cycle of this job's radials.
    fn t(&self) -> Duration;

    /// Requested/clamped update period (`U >= T` always holds post
    /// construction).
    fn u(&self) -> Duration;

    /// Current dwell time per radial. For `Vcp` this reads off the
    /// iterator's current elevation cut; for other jobs it is fixed.
    fn dwell_time(&self) -> Duration;

    /// Current pulse repetition time. See `dwell_time`.
    fn prt(&self) -> Duration;

    /// `next_call_count / radial_chunk_count`: the fractional number of
    /// full radial cycles completed so far.
    fn loopcnt_frac(&self) -> f64;

    /// Replace the radial iterator with `radials`, keeping
    /// `next_call_count` (and hence `loopcnt_frac`'s numerator) intact.
    /// Used by feature-tracking controllers to steer a job at a moved
    /// feature without losing its identity or counters.
    fn reset(&mut self, radials: BaseNDIter);

    /// Human-readable job kind, for logging.
    fn kind(&self) -> &'static str;
}

/// `T = dwell_time * radial_count(slice)`, excluding the range-gate axis.
/// Shared by every job whose dwell time is constant across radials.
pub(crate) fn task_duration(dwell_time: Duration, slice: &SliceTuple) -> Duration {
    dwell_time.saturating_mul(slice.radial_count() as u64)
}

/// Sum `task_duration` over one full, non-advancing cycle of `radials`,
/// using a clone so the live iterator's cursor is untouched — this is the
/// "time-for-job" helper from §4.2.
pub(crate) fn cycle_total_duration(radials: &BaseNDIter, dwell_time: Duration) -> Duration {
    let probe = radials.clone();
    let n = probe.cycle_len();
    probe
        .take(n)
        .map(|slice| task_duration(dwell_time, &slice))
        .fold(Duration::ZERO, |acc, d| acc + d)
}
