//! [`Simulator`]: walks an ordered sequence of timestamped radar volumes,
//! linearly interpolates reflectivity between them, and applies retired
//! scan tasks' writes to a working grid.

use crate::error::RadsimError;
use crate::grid::Grid3;
use crate::scheduler::TaskScheduler;
use crate::slice::SliceTuple;
use std::collections::HashMap;

/// One timestamped reflectivity volume from the external volume source.
pub struct VolumeFrame {
    /// Absolute simulated time, in microseconds, this frame was scanned at.
    pub scan_time: u64,
    /// The full (elevation, azimuth, range-gate) reflectivity array.
    pub vals: Grid3,
}

/// Walks a lazy sequence of [`VolumeFrame`]s, interpolating between the
/// current and next frame and applying retired tasks' writes to a working
/// view. `radial_age`/`update_count` are keyed on `(elevation, azimuth)`,
/// since the range-gate axis is never subdivided by the scheduler.
pub struct Simulator<S: Iterator<Item = VolumeFrame>> {
    source: S,
    current: VolumeFrame,
    next: Option<VolumeFrame>,
    slope: Grid3,
    curr_view: Grid3,
    radial_age: HashMap<(usize, usize), u64>,
    update_count: HashMap<(usize, usize), u64>,
}

impl<S: Iterator<Item = VolumeFrame>> Simulator<S> {
    /// Build a simulator from a volume source. Requires at least 2 frames
    /// up front; fails with [`RadsimError::InsufficientFrames`] otherwise.
    pub fn new(mut source: S) -> Result<Self, RadsimError> {
        let current = source.next().ok_or(RadsimError::InsufficientFrames(0))?;
        let next = source.next().ok_or(RadsimError::InsufficientFrames(1))?;

        let curr_view = current.vals.clone();
        let slope = compute_slope(&current.vals, &next.vals, next.scan_time - current.scan_time);

        Ok(Simulator {
            source,
            current,
            next: Some(next),
            slope,
            curr_view,
            radial_age: HashMap::new(),
            update_count: HashMap::new(),
        })
    }

    /// The current working view of the grid.
    pub fn current_view(&self) -> &Grid3 {
        &self.curr_view
    }

    /// Last time a given (elevation, azimuth) radial was updated.
    pub fn radial_age(&self, elevation: usize, azimuth: usize) -> Option<u64> {
        self.radial_age.get(&(elevation, azimuth)).copied()
    }

    /// Number of times a given (elevation, azimuth) radial has been updated.
    pub fn update_count(&self, elevation: usize, azimuth: usize) -> u64 {
        self.update_count.get(&(elevation, azimuth)).copied().unwrap_or(0)
    }

    /// Advance the simulation to time `now`:
    ///   1. If `now >= next.scan_time`, advance the frame pair and
    ///      recompute the interpolation slope. Returns `Ok(false)` if the
    ///      volume source is exhausted.
    ///   2. For every task across `scheduler`'s slots not yet running,
    ///      flip it running and write the interpolated value into
    ///      `curr_view` over `task.slice ∩ bounding_volume`, bumping
    ///      `radial_age`/`update_count` for every touched radial.
    #[tracing::instrument(skip(self, scheduler, bounding_volume), fields(now))]
    pub fn update(&mut self, now: u64, scheduler: &mut TaskScheduler, bounding_volume: &SliceTuple) -> Result<bool, RadsimError> {
        let should_advance = match &self.next {
            Some(next) => now >= next.scan_time,
            None => return Ok(false),
        };

        if should_advance {
            let arrived = self.next.take().expect("checked Some above");
            tracing::info!(scan_time = arrived.scan_time, "advancing to next volume frame");
            self.current = arrived;
            match self.source.next() {
                Some(new_next) => {
                    self.slope = compute_slope(&self.current.vals, &new_next.vals, new_next.scan_time - self.current.scan_time);
                    self.next = Some(new_next);
                }
                None => {
                    tracing::info!("volume source exhausted");
                    return Ok(false);
                }
            }
        }

        let dt_us = now.saturating_sub(self.current.scan_time) as f64;

        for index in 0..scheduler.concurrent_max() {
            let pending = scheduler.slot_task(index).filter(|t| !t.is_running).map(|t| t.slice.clone());
            if let Some(slice) = pending {
                let region = slice.intersect(bounding_volume);
                let touched = self.curr_view.apply_interpolated(&self.current.vals, &self.slope, &region, dt_us);
                for (e, a) in touched {
                    self.radial_age.insert((e, a), now);
                    *self.update_count.entry((e, a)).or_insert(0) += 1;
                }
                scheduler.slot_task_mut(index).unwrap().is_running = true;
            }
        }

        Ok(true)
    }
}

/// Per-cell `(next - curr) / dt_us`, the linear slope used to interpolate
/// reflectivity between two frames.
fn compute_slope(curr: &Grid3, next: &Grid3, dt_us: u64) -> Grid3 {
    debug_assert_eq!(curr.shape(), next.shape());
    let shape = curr.shape();
    let mut slope = Grid3::filled(shape, 0.0);
    let dt = dt_us.max(1) as f32;
    for e in 0..shape[0] {
        for a in 0..shape[1] {
            for g in 0..shape[2] {
                slope.set(e, a, g, (next.get(e, a, g) - curr.get(e, a, g)) / dt);
            }
        }
    }
    slope
}
