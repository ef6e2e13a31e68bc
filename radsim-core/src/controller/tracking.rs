//! `SimpleTracking`: the same +35 dBZ detection as [`crate::controller::Simple`],
//! but preserving job identity across volumes via overlap association
//! instead of replacing the whole batch every step.

use std::collections::HashSet;

use crate::controller::features::label_components;
use crate::controller::{AdaptStep, Controller};
use crate::grid::Grid3;
use crate::iter::ChunkIter;
use crate::job::{ScanJob, StaticJob};
use crate::slice::SliceTuple;
use crate::task::JobId;
use crate::time::Duration;

const DETECTION_THRESHOLD: f32 = 35.0;
const MIN_RADIAL_COUNT: usize = 20;
const FEATURE_CHUNK_WIDTH: usize = 5;
const FEATURE_UPDATE_PERIOD: Duration = Duration::from_micros(20_000_000);
const FEATURE_DWELL: Duration = Duration::from_micros(64_000);
const FEATURE_PRT: Duration = Duration::from_micros(800);

/// Tracks a storm feature's identity frame-to-frame by bounding-box overlap
/// with the previous volume's labeled components, resetting a surviving
/// job's radial iterator in place rather than tearing it down and
/// re-registering a fresh one.
#[derive(Debug)]
pub struct SimpleTracking {
    volume: SliceTuple,
    /// Previously-registered jobs and the feature region they were last
    /// pointed at.
    prev: Vec<(JobId, SliceTuple)>,
    /// Bounding boxes for this step's `to_add` jobs, in the same order, so
    /// `ack_added` can fold the ids the scheduler assigns back into `prev`.
    pending_new: Vec<SliceTuple>,
}

impl SimpleTracking {
    /// `volume` restricts detection to a sub-region of the grid.
    pub fn new(volume: SliceTuple) -> Self {
        SimpleTracking { volume, prev: Vec::new(), pending_new: Vec::new() }
    }

    fn detect(&self, grid: &Grid3) -> Vec<SliceTuple> {
        label_components(grid, &self.volume, DETECTION_THRESHOLD, false)
            .into_iter()
            .filter(|c| c.radial_count >= MIN_RADIAL_COUNT)
            .map(|c| c.bbox)
            .collect()
    }
}

impl Controller for SimpleTracking {
    fn step(&mut self, _now: u64, grid: &Grid3) -> AdaptStep {
        let shape = grid.shape();
        let components = self.detect(grid);

        if components.is_empty() {
            let to_remove = self.prev.drain(..).map(|(id, _)| id).collect();
            self.pending_new.clear();
            return AdaptStep { to_add: Vec::new(), to_remove, to_reset: Vec::new() };
        }

        // overlap[i][k]: count of region shared between previous job i's
        // last-known slice and this step's component k, approximated as
        // the bounding-box intersection's radial count.
        let overlaps: Vec<Vec<usize>> = self
            .prev
            .iter()
            .map(|(_, s)| components.iter().map(|k| s.intersect(k).radial_count()).collect())
            .collect();

        let mut claim: Vec<Option<usize>> = overlaps
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .max_by_key(|&(_, &v)| v)
                    .and_then(|(k, &v)| if v > 0 { Some(k) } else { None })
            })
            .collect();

        // Resolve collisions: if two previous jobs claim the same
        // component, only the larger-overlap claimant survives.
        for k in 0..components.len() {
            let claimants: Vec<usize> = (0..claim.len()).filter(|&i| claim[i] == Some(k)).collect();
            if claimants.len() > 1 {
                let winner = *claimants.iter().max_by_key(|&&i| overlaps[i][k]).unwrap();
                for &i in &claimants {
                    if i != winner {
                        claim[i] = None;
                    }
                }
            }
        }

        let mut matched: HashSet<usize> = HashSet::new();
        let mut to_remove = Vec::new();
        let mut to_reset = Vec::new();
        let mut new_prev = Vec::new();

        for (i, (id, _)) in self.prev.iter().enumerate() {
            match claim[i] {
                Some(k) => match ChunkIter::build(&shape, FEATURE_CHUNK_WIDTH, Some(components[k].clone())) {
                    Ok(radials) => {
                        matched.insert(k);
                        to_reset.push((*id, radials));
                        new_prev.push((*id, components[k].clone()));
                    }
                    Err(_) => to_remove.push(*id),
                },
                None => to_remove.push(*id),
            }
        }

        let mut to_add: Vec<Box<dyn ScanJob>> = Vec::new();
        let mut pending_new = Vec::new();
        for (k, bbox) in components.iter().enumerate() {
            if matched.contains(&k) {
                continue;
            }
            if let Ok(radials) = ChunkIter::build(&shape, FEATURE_CHUNK_WIDTH, Some(bbox.clone())) {
                to_add.push(Box::new(StaticJob::new(radials, FEATURE_DWELL, FEATURE_PRT, FEATURE_UPDATE_PERIOD)));
                pending_new.push(bbox.clone());
            }
        }

        self.prev = new_prev;
        self.pending_new = pending_new;
        AdaptStep { to_add, to_remove, to_reset }
    }

    fn ack_added(&mut self, ids: &[JobId]) {
        for (id, bbox) in ids.iter().zip(self.pending_new.drain(..)) {
            self.prev.push((*id, bbox));
        }
    }

    fn name(&self) -> &'static str {
        "simple_tracking"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_hot_band(shape: [usize; 3], azimuths: std::ops::Range<usize>) -> Grid3 {
        let mut grid = Grid3::filled(shape, 0.0);
        for a in azimuths {
            grid.set(0, a, 0, 50.0);
        }
        grid
    }

    #[test]
    fn same_feature_position_resets_instead_of_recreating() {
        let shape = [1usize, 30, 100];
        let mut ctrl = SimpleTracking::new(SliceTuple::full(&shape));
        let grid = grid_with_hot_band(shape, 0..25);

        let first = ctrl.step(0, &grid);
        assert_eq!(first.to_add.len(), 1);
        assert!(first.to_reset.is_empty());
        ctrl.ack_added(&[JobId(42)]);

        let second = ctrl.step(1, &grid);
        assert!(second.to_add.is_empty());
        assert_eq!(second.to_reset.len(), 1);
        assert_eq!(second.to_reset[0].0, JobId(42));
        assert!(second.to_remove.is_empty());
    }

    #[test]
    fn feature_moving_out_of_overlap_replaces_job() {
        let shape = [1usize, 60, 100];
        let mut ctrl = SimpleTracking::new(SliceTuple::full(&shape));
        let first_grid = grid_with_hot_band(shape, 0..25);
        let first = ctrl.step(0, &first_grid);
        ctrl.ack_added(&[JobId(1)]);
        assert_eq!(first.to_add.len(), 1);

        let moved_grid = grid_with_hot_band(shape, 30..55);
        let second = ctrl.step(1, &moved_grid);
        assert_eq!(second.to_remove, vec![JobId(1)]);
        assert_eq!(second.to_add.len(), 1);
        assert!(second.to_reset.is_empty());
    }

    #[test]
    fn no_components_clears_all_prev_jobs() {
        let shape = [1usize, 30, 100];
        let mut ctrl = SimpleTracking::new(SliceTuple::full(&shape));
        let grid = grid_with_hot_band(shape, 0..25);
        ctrl.step(0, &grid);
        ctrl.ack_added(&[JobId(5)]);

        let cold = Grid3::filled(shape, 0.0);
        let step = ctrl.step(1, &cold);
        assert_eq!(step.to_remove, vec![JobId(5)]);
        assert!(step.to_add.is_empty());
    }
}
