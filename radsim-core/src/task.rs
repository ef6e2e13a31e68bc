//! [`ScanOperation`]: a leaf unit of scan work produced by a [`crate::job::ScanJob`].

use crate::slice::SliceTuple;
use crate::time::Duration;

/// Non-owning handle to a registered job, an index into
/// [`crate::scheduler::TaskScheduler`]'s job list. Never an owning
/// reference — the scheduler owns jobs, tasks only point back at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

/// A single non-preemptible scan: a slice of the grid plus the tx/rx/wait
/// timing it takes to acquire it.
#[derive(Debug, Clone)]
pub struct ScanOperation {
    /// The job that produced this task.
    pub job_id: JobId,
    /// The grid region this task scans.
    pub slice: SliceTuple,
    /// Transmit time.
    pub tx_time: Duration,
    /// Receive time.
    pub rx_time: Duration,
    /// Optional idle wait appended after tx/rx.
    pub wait_time: Option<Duration>,
    /// Set by the simulator once it has applied this task's grid write.
    /// Before that point the task occupies a slot but has not yet touched
    /// the working grid.
    pub is_running: bool,
}

impl ScanOperation {
    /// Build a task with the standard 10% duty cycle: `tx = total / 10`
    /// (truncating), `rx = total - tx`, no wait.
    pub fn with_duty_cycle(job_id: JobId, slice: SliceTuple, total: Duration) -> Self {
        let tx_time = total.div_trunc(10);
        let rx_time = total.saturating_sub(tx_time);
        ScanOperation {
            job_id,
            slice,
            tx_time,
            rx_time,
            wait_time: None,
            is_running: false,
        }
    }

    /// Total task duration `T = tx_time + rx_time + wait_time`.
    pub fn total(&self) -> Duration {
        self.tx_time + self.rx_time + self.wait_time.unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::Slice;

    #[test]
    fn duty_cycle_is_ten_percent_truncated() {
        let slice = SliceTuple(vec![Slice::full(1), Slice::full(1), Slice::full(1)]);
        let op = ScanOperation::with_duty_cycle(JobId(0), slice, Duration::from_micros(105));
        assert_eq!(op.tx_time, Duration::from_micros(10));
        assert_eq!(op.rx_time, Duration::from_micros(95));
        assert_eq!(op.total(), Duration::from_micros(105));
    }
}
