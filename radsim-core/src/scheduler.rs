//! [`TaskScheduler`]: the fixed-width slot pool that advances active
//! [`ScanOperation`]s in lockstep and reports QoS metrics over the jobs it
//! manages.

use crate::error::RadsimError;
use crate::iter::BaseNDIter;
use crate::job::ScanJob;
use crate::task::{JobId, ScanOperation};
use crate::time::{Duration, Ratio, MAX_DURATION};

struct Slot {
    task: Option<ScanOperation>,
    active_time: Duration,
}

impl Slot {
    fn empty() -> Self {
        Slot { task: None, active_time: Duration::ZERO }
    }
}

/// One registered job plus the scheduler's private bookkeeping for it.
struct Registered {
    id: JobId,
    job: Box<dyn ScanJob>,
    lifetime: Duration,
}

/// A fixed-size pool of concurrently-active [`ScanOperation`] slots, plus
/// the registered [`ScanJob`]s competing for them.
///
/// `concurrent_max` models the radar hardware's parallelism (typically 1):
/// up to that many non-preemptible tasks advance their `active_time` in
/// lockstep on every [`TaskScheduler::increment_timer`] call.
pub struct TaskScheduler {
    slots: Vec<Slot>,
    jobs: Vec<Registered>,
    next_id: u64,
    sched_lifetime: Duration,
    ratio_denom: i64,
    /// Largest overrun (`active_time - task.T`) observed at any retirement.
    pub max_time_over: Duration,
    /// Sum of every overrun observed at retirement.
    pub sum_time_over: Duration,
}

impl TaskScheduler {
    /// Build a scheduler with `concurrent_max` slots (must be `>= 1`) and
    /// a `true_update_period` rational-approximation denominator cap.
    pub fn new(concurrent_max: usize, ratio_denom: i64) -> Self {
        debug_assert!(concurrent_max >= 1);
        TaskScheduler {
            slots: (0..concurrent_max).map(|_| Slot::empty()).collect(),
            jobs: Vec::new(),
            next_id: 0,
            sched_lifetime: Duration::ZERO,
            ratio_denom,
            max_time_over: Duration::ZERO,
            sum_time_over: Duration::ZERO,
        }
    }

    /// Number of slots.
    pub fn concurrent_max(&self) -> usize {
        self.slots.len()
    }

    /// Register new jobs, each starting with a zeroed lifetime. Returns
    /// the assigned [`JobId`]s in registration order.
    pub fn add_jobs(&mut self, jobs: Vec<Box<dyn ScanJob>>) -> Vec<JobId> {
        let mut ids = Vec::with_capacity(jobs.len());
        for job in jobs {
            let id = JobId(self.next_id);
            self.next_id += 1;
            self.jobs.push(Registered { id, job, lifetime: Duration::ZERO });
            ids.push(id);
            tracing::debug!(job_id = id.0, "job registered");
        }
        ids
    }

    /// Mark jobs for removal. A job with no active task in any slot is
    /// dropped immediately; a job with an active task lingers until
    /// [`TaskScheduler::rm_deactive`] retires that task naturally — its
    /// slot keeps running, but the job is already absent from
    /// [`TaskScheduler::job_ids`].
    ///
    /// Fails with [`RadsimError::UnknownJob`] if any id was never
    /// registered.
    pub fn remove_jobs(&mut self, ids: &[JobId]) -> Result<(), RadsimError> {
        for &id in ids {
            let pos = self.jobs.iter().position(|r| r.id == id).ok_or(RadsimError::UnknownJob(id.0))?;
            self.jobs.remove(pos);
            tracing::debug!(job_id = id.0, "job removed");
        }
        Ok(())
    }

    /// Currently-registered job ids, in registration order.
    pub fn job_ids(&self) -> Vec<JobId> {
        self.jobs.iter().map(|r| r.id).collect()
    }

    /// Replace `id`'s radial iterator in place, preserving its `next_call_count`
    /// and in-flight task. Used by feature-tracking controllers to steer a
    /// surviving job at a moved feature without losing its identity.
    ///
    /// Fails with [`RadsimError::UnknownJob`] if `id` was never registered.
    pub fn reset_job(&mut self, id: JobId, radials: BaseNDIter) -> Result<(), RadsimError> {
        let registered = self.jobs.iter_mut().find(|r| r.id == id).ok_or(RadsimError::UnknownJob(id.0))?;
        registered.job.reset(radials);
        Ok(())
    }

    /// True iff at least one slot is empty.
    pub fn is_available(&self) -> bool {
        self.slots.iter().any(|s| s.task.is_none())
    }

    /// Place a freshly-produced [`ScanOperation`] from `id` into the
    /// first free slot. `auto_activate` seeds the task's `is_running`
    /// flag; the simulator flips it true itself once it applies the
    /// task's grid write, so callers normally pass `false`.
    ///
    /// Fails with [`RadsimError::NoFreeSlot`] if every slot is occupied.
    pub fn add_active(&mut self, id: JobId, auto_activate: bool) -> Result<(), RadsimError> {
        let slot_index = self.slots.iter().position(|s| s.task.is_none()).ok_or(RadsimError::NoFreeSlot {
            concurrent_max: self.slots.len(),
        })?;
        let registered = self.jobs.iter_mut().find(|r| r.id == id).ok_or(RadsimError::UnknownJob(id.0))?;

        let mut task = registered.job.next_operation(id);
        task.is_running = auto_activate;
        self.slots[slot_index] = Slot { task: Some(task), active_time: Duration::ZERO };
        Ok(())
    }

    /// Default slot-filling policy: for each free slot, activate the
    /// registered job (not already running a task in another slot) whose
    /// deadline `U - lifetime` is soonest. A driver with its own policy
    /// can ignore this and call `add_active` directly.
    #[tracing::instrument(skip(self))]
    pub fn next_jobs(&mut self, auto_activate: bool) {
        loop {
            if self.slots.iter().all(|s| s.task.is_some()) {
                break;
            }
            let busy: std::collections::HashSet<JobId> =
                self.slots.iter().filter_map(|s| s.task.as_ref().map(|t| t.job_id)).collect();
            let soonest = self
                .jobs
                .iter()
                .filter(|r| !busy.contains(&r.id))
                .min_by_key(|r| r.job.u().as_micros().saturating_sub(r.lifetime.as_micros()))
                .map(|r| r.id);
            let Some(id) = soonest else { break };
            if self.add_active(id, auto_activate).is_err() {
                break;
            }
        }
    }

    /// Read-only access to a slot's current task, if occupied.
    pub fn slot_task(&self, index: usize) -> Option<&ScanOperation> {
        self.slots[index].task.as_ref()
    }

    /// Mutable access to a slot's current task, for the simulator to flip
    /// `is_running` once it applies the task's write.
    pub fn slot_task_mut(&mut self, index: usize) -> Option<&mut ScanOperation> {
        self.slots[index].task.as_mut()
    }

    /// Advance `sched_lifetime`, every job's lifetime, and every occupied
    /// slot's `active_time` by `dt`, then retire any slot whose task has
    /// run its full duration.
    #[tracing::instrument(skip(self), fields(dt_us = dt.as_micros()))]
    pub fn increment_timer(&mut self, dt: Duration) {
        self.sched_lifetime += dt;
        for registered in &mut self.jobs {
            registered.lifetime += dt;
        }
        for slot in &mut self.slots {
            if slot.task.is_some() {
                slot.active_time += dt;
            }
        }
        self.rm_deactive();
    }

    /// Retire every slot whose `active_time >= task.T`, accounting the
    /// overrun into `max_time_over`/`sum_time_over`.
    pub fn rm_deactive(&mut self) {
        for slot in &mut self.slots {
            if let Some(task) = &mut slot.task {
                if slot.active_time >= task.total() {
                    task.is_running = false;
                    let overrun = slot.active_time.saturating_sub(task.total());
                    self.max_time_over = self.max_time_over.max(overrun);
                    self.sum_time_over += overrun;
                    if overrun > Duration::ZERO {
                        tracing::warn!(overrun_us = overrun.as_micros(), "task slot retired with overrun");
                    }
                    slot.task = None;
                    slot.active_time = Duration::ZERO;
                }
            }
        }
    }

    /// `task.T - active_time` for the slot running `id`'s task, or
    /// `Duration::ZERO` if `id` has no active task. Compensates for a
    /// job's `loopcnt_frac` treating an in-flight task as already done.
    pub fn remain_time(&self, id: JobId) -> Duration {
        self.slots
            .iter()
            .filter(|s| s.task.as_ref().is_some_and(|t| t.job_id == id))
            .map(|s| s.task.as_ref().unwrap().total().saturating_sub(s.active_time))
            .fold(Duration::ZERO, Duration::max)
    }

    /// `elapsed * denom(f) / numer(f)`, where `f = loopcnt_frac`
    /// rationalized with denominator `<= ratio_denom`. Returns
    /// [`MAX_DURATION`] if `f == 0`.
    pub fn true_update_period(&self, loopcnt_frac: f64, elapsed: Duration) -> Duration {
        let ratio = Ratio::approximate(loopcnt_frac, self.ratio_denom);
        if ratio.numer == 0 {
            return MAX_DURATION;
        }
        elapsed.saturating_mul(ratio.denom as u64).div_trunc(ratio.numer as u64)
    }

    /// `(1 / concurrent_max) * sum(T(job) / U(job))`, skipping jobs with
    /// `T == 0` or `U == MAX_DURATION`.
    pub fn occupancy(&self) -> f64 {
        let sum: f64 = self
            .jobs
            .iter()
            .filter(|r| r.job.t() != Duration::ZERO && !r.job.u().is_max())
            .map(|r| r.job.t().as_micros() as f64 / r.job.u().as_micros() as f64)
            .sum();
        sum / self.slots.len() as f64
    }

    /// `sum(u_max * T_i / U_i)` over jobs with `loopcnt_frac >= 0.35`,
    /// where `U_i = true_update_period(job_i, remain_time(job_i) +
    /// lifetime_i)` and `u_max` is the largest finite `U_i`. `NaN` if no
    /// job qualifies.
    pub fn acquisition(&self) -> f64 {
        let qualifying: Vec<(Duration, Duration)> = self
            .jobs
            .iter()
            .filter(|r| r.job.loopcnt_frac() >= 0.35)
            .map(|r| {
                let elapsed = self.remain_time(r.id) + r.lifetime;
                let u = self.true_update_period(r.job.loopcnt_frac(), elapsed);
                (r.job.t(), u)
            })
            .collect();

        let u_max = qualifying.iter().filter(|(_, u)| !u.is_max()).map(|(_, u)| u.as_micros()).max();

        match u_max {
            Some(u_max) => qualifying
                .iter()
                .filter(|(_, u)| !u.is_max())
                .map(|(t, u)| (u_max as f64) * (t.as_micros() as f64) / (u.as_micros() as f64))
                .sum(),
            None => f64::NAN,
        }
    }

    /// `(base_update_period / |jobs|) * sum(loopcnt_frac(job) /
    /// (lifetime(job) + remain_time(job)))` over jobs with positive
    /// elapsed time. `NaN` if there are no jobs.
    pub fn improve_factor(&self, base_update_period: Duration) -> f64 {
        if self.jobs.is_empty() {
            return f64::NAN;
        }
        let sum: f64 = self
            .jobs
            .iter()
            .filter_map(|r| {
                let elapsed = r.lifetime + self.remain_time(r.id);
                if elapsed == Duration::ZERO {
                    None
                } else {
                    Some(r.job.loopcnt_frac() / elapsed.as_micros() as f64)
                }
            })
            .sum();
        (base_update_period.as_micros() as f64 / self.jobs.len() as f64) * sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::ChunkIter;
    use crate::job::StaticJob;

    fn static_job(t_micros: u64) -> Box<dyn ScanJob> {
        let radials = ChunkIter::build(&[2, 2, 10], 1, None).unwrap();
        Box::new(StaticJob::new(
            radials,
            Duration::from_micros(t_micros / 4),
            Duration::from_micros(1),
            Duration::ZERO,
        ))
    }

    #[test]
    fn overrun_is_measured_not_clamped() {
        let mut sched = TaskScheduler::new(1, 100);
        let ids = sched.add_jobs(vec![static_job(400)]);
        sched.add_active(ids[0], false).unwrap();
        let t = sched.slot_task(0).unwrap().total();
        sched.increment_timer(t + Duration::from_micros(50));
        assert!(sched.slot_task(0).is_none());
        assert_eq!(sched.max_time_over, Duration::from_micros(50));
        assert_eq!(sched.sum_time_over, Duration::from_micros(50));
    }

    #[test]
    fn no_free_slot_errors() {
        let mut sched = TaskScheduler::new(1, 100);
        let ids = sched.add_jobs(vec![static_job(400), static_job(400)]);
        sched.add_active(ids[0], false).unwrap();
        assert!(matches!(sched.add_active(ids[1], false), Err(RadsimError::NoFreeSlot { .. })));
    }

    #[test]
    fn unknown_job_removal_errors() {
        let mut sched = TaskScheduler::new(1, 100);
        assert!(matches!(sched.remove_jobs(&[JobId(999)]), Err(RadsimError::UnknownJob(999))));
    }

    #[test]
    fn deferred_removal_keeps_active_slot_occupied() {
        let mut sched = TaskScheduler::new(1, 100);
        let ids = sched.add_jobs(vec![static_job(400)]);
        sched.add_active(ids[0], false).unwrap();
        sched.remove_jobs(&ids).unwrap();
        assert!(sched.job_ids().is_empty());
        assert!(sched.slot_task(0).is_some());
        let t = sched.slot_task(0).unwrap().total();
        sched.increment_timer(t);
        assert!(sched.slot_task(0).is_none());
    }

    #[test]
    fn next_jobs_fills_every_free_slot() {
        let mut sched = TaskScheduler::new(2, 100);
        sched.add_jobs(vec![static_job(400), static_job(400)]);
        sched.next_jobs(false);
        assert!(sched.slot_task(0).is_some());
        assert!(sched.slot_task(1).is_some());
    }

    #[test]
    fn next_jobs_leaves_excess_slots_empty_when_out_of_jobs() {
        let mut sched = TaskScheduler::new(2, 100);
        sched.add_jobs(vec![static_job(400)]);
        sched.next_jobs(false);
        assert!(sched.slot_task(0).is_some());
        assert!(sched.slot_task(1).is_none());
    }

    #[test]
    fn true_update_period_is_max_when_loopcnt_frac_is_zero() {
        let sched = TaskScheduler::new(1, 100);
        assert_eq!(sched.true_update_period(0.0, Duration::from_micros(1000)), MAX_DURATION);
    }
}
