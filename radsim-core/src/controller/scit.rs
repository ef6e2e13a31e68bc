//! `SCITish`: centroid-based storm tracking delegated to an external
//! tracker, mirroring the `scit_step` collaborator described for SCIT
//! (Storm Cell Identification and Tracking) association. Only the
//! interface to the tracker is fixed; the matching algorithm is a
//! pluggable [`ScitTracker`] implementation.

use std::collections::{HashMap, HashSet};

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

/// One storm cell handed to the tracker: a rectilinear-projected centroid
/// plus the index of the grid component it came from this step
/// (`cornerIDs[-1]`'s role in the original implementation).
#[derive(Debug, Clone, Copy)]
pub struct StormCell {
    /// Projected x-coordinate.
    pub x: f64,
    /// Projected y-coordinate.
    pub y: f64,
    /// Index into this step's detected component list.
    pub id: usize,
}

/// One volume's worth of tracker input.
#[derive(Debug, Clone)]
pub struct ScitVolume {
    /// Monotonically increasing frame counter.
    pub frame_num: u64,
    /// Rounded-to-seconds volume time.
    pub vol_time: u64,
    /// This step's detected storm cells.
    pub storm_cells: Vec<StormCell>,
}

/// Result of one tracker step.
#[derive(Debug, Clone, Default)]
pub struct TrackDelta {
    /// Tracks with no match this step; they end.
    pub tracks_to_end: Vec<u64>,
    /// Tracks matched to a storm cell this step; they continue.
    pub tracks_to_keep: Vec<u64>,
    /// Storm cells with no matching track; new tracks are started for them.
    pub tracks_to_add: Vec<u64>,
    /// For every id in `tracks_to_keep` or `tracks_to_add`, the storm
    /// cell id (component index) it matched to this step.
    pub mapping: Vec<(u64, usize)>,
}

/// External collaborator: associates storm cells across volumes into
/// tracks, given an adaptive distance threshold. Only this interface is
/// fixed — the association strategy is free.
pub trait ScitTracker: std::fmt::Debug {
    /// Advance the tracker by one volume.
    fn step(&mut self, vol: &ScitVolume, dist_thresh: f64) -> TrackDelta;
}

/// Default tracker: greedy nearest-centroid matching within `dist_thresh`.
/// Not globally optimal (no Hungarian-style reassignment), but a
/// reasonable default consistent with SCIT's original "nearest within
/// adaptive radius" association.
#[derive(Debug, Default)]
pub struct GreedyCentroidTracker {
    next_track_id: u64,
    live: Vec<(u64, f64, f64)>,
}

impl ScitTracker for GreedyCentroidTracker {
    fn step(&mut self, vol: &ScitVolume, dist_thresh: f64) -> TrackDelta {
        let mut used: HashSet<usize> = HashSet::new();
        let mut delta = TrackDelta::default();
        let mut new_live = Vec::new();

        for &(tid, tx, ty) in &self.live {
            let best = vol
                .storm_cells
                .iter()
                .enumerate()
                .filter(|(idx, _)| !used.contains(idx))
                .map(|(idx, c)| (idx, ((c.x - tx).powi(2) + (c.y - ty).powi(2)).sqrt()))
                .filter(|&(_, d)| d <= dist_thresh)
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

            match best {
                Some((idx, _)) => {
                    used.insert(idx);
                    let cell = vol.storm_cells[idx];
                    new_live.push((tid, cell.x, cell.y));
                    delta.tracks_to_keep.push(tid);
                    delta.mapping.push((tid, cell.id));
                }
                None => delta.tracks_to_end.push(tid),
            }
        }

        for (idx, cell) in vol.storm_cells.iter().enumerate() {
            if used.contains(&idx) {
                continue;
            }
            let tid = self.next_track_id;
            self.next_track_id += 1;
            new_live.push((tid, cell.x, cell.y));
            delta.tracks_to_add.push(tid);
            delta.mapping.push((tid, cell.id));
        }

        self.live = new_live;
        delta
    }
}

/// SCIT-style controller: label-weighted centroids, a rectilinear
/// projection, and an external [`ScitTracker`] with an adaptive
/// `dist_thresh = speed_thresh * dt`.
pub struct SimpleScit {
    volume: SliceTuple,
    speed_thresh: f64,
    to_rect: Box<dyn Fn(f64, f64) -> (f64, f64) + Send + Sync>,
    tracker: Box<dyn ScitTracker + Send + Sync>,
    last_vol_time: Option<u64>,
    frame_num: u64,
    /// track_id -> (registered job id, last bbox).
    live_jobs: HashMap<u64, (JobId, SliceTuple)>,
    /// track_id -> bbox for this step's `to_add`, awaiting `ack_added`.
    pending: Vec<(u64, SliceTuple)>,
}

impl std::fmt::Debug for SimpleScit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleScit")
            .field("speed_thresh", &self.speed_thresh)
            .field("live_jobs", &self.live_jobs.len())
            .finish()
    }
}

impl SimpleScit {
    /// `volume` restricts detection to a sub-region of the grid;
    /// `speed_thresh` is the assumed storm-motion speed (grid units per
    /// second of simulated time) used to size the tracker's distance
    /// threshold.
    pub fn new(volume: SliceTuple, speed_thresh: f64) -> Self {
        SimpleScit {
            volume,
            speed_thresh,
            to_rect: Box::new(|e, a| (e, a)),
            tracker: Box::new(GreedyCentroidTracker::default()),
            last_vol_time: None,
            frame_num: 0,
            live_jobs: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Override the rectilinear projection (defaults to an identity
    /// passthrough of the `(elevation, azimuth)` centroid).
    pub fn with_projection(mut self, to_rect: impl Fn(f64, f64) -> (f64, f64) + Send + Sync + 'static) -> Self {
        self.to_rect = Box::new(to_rect);
        self
    }

    /// Override the tracker (defaults to [`GreedyCentroidTracker`]).
    pub fn with_tracker(mut self, tracker: impl ScitTracker + Send + Sync + 'static) -> Self {
        self.tracker = Box::new(tracker);
        self
    }
}

impl Controller for SimpleScit {
    fn step(&mut self, now: u64, grid: &Grid3) -> AdaptStep {
        let shape = grid.shape();
        let components: Vec<_> = label_components(grid, &self.volume, DETECTION_THRESHOLD, false)
            .into_iter()
            .filter(|c| c.radial_count >= MIN_RADIAL_COUNT)
            .collect();

        let vol_time = now / 1_000_000;
        let dt = self.last_vol_time.map(|prev| vol_time.saturating_sub(prev)).unwrap_or(0) as f64;
        self.last_vol_time = Some(vol_time);
        let dist_thresh = self.speed_thresh * dt;

        let storm_cells: Vec<StormCell> = components
            .iter()
            .enumerate()
            .map(|(id, c)| {
                let (x, y) = (self.to_rect)(c.centroid.0, c.centroid.1);
                StormCell { x, y, id }
            })
            .collect();

        let vol = ScitVolume { frame_num: self.frame_num, vol_time, storm_cells };
        self.frame_num += 1;

        let delta = self.tracker.step(&vol, dist_thresh);
        let mapped: HashMap<u64, usize> = delta.mapping.iter().copied().collect();

        let mut to_remove = Vec::new();
        for tid in &delta.tracks_to_end {
            if let Some((id, _)) = self.live_jobs.remove(tid) {
                to_remove.push(id);
            }
        }

        let mut to_reset = Vec::new();
        for tid in &delta.tracks_to_keep {
            let Some(&cell_id) = mapped.get(tid) else { continue };
            let bbox = components[cell_id].bbox.clone();
            if let Some((id, last_bbox)) = self.live_jobs.get_mut(tid) {
                if let Ok(radials) = ChunkIter::build(&shape, FEATURE_CHUNK_WIDTH, Some(bbox.clone())) {
                    to_reset.push((*id, radials));
                    *last_bbox = bbox;
                }
            }
        }

        let mut to_add: Vec<Box<dyn ScanJob>> = Vec::new();
        let mut pending = Vec::new();
        for tid in &delta.tracks_to_add {
            let Some(&cell_id) = mapped.get(tid) else { continue };
            let bbox = components[cell_id].bbox.clone();
            if let Ok(radials) = ChunkIter::build(&shape, FEATURE_CHUNK_WIDTH, Some(bbox.clone())) {
                to_add.push(Box::new(StaticJob::new(radials, FEATURE_DWELL, FEATURE_PRT, FEATURE_UPDATE_PERIOD)));
                pending.push((*tid, bbox));
            }
        }
        self.pending = pending;

        AdaptStep { to_add, to_remove, to_reset }
    }

    fn ack_added(&mut self, ids: &[JobId]) {
        for (id, (tid, bbox)) in ids.iter().zip(self.pending.drain(..)) {
            self.live_jobs.insert(tid, (*id, bbox));
        }
    }

    fn name(&self) -> &'static str {
        "scit"
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
    fn stationary_feature_keeps_its_track() {
        let shape = [1usize, 30, 100];
        let mut ctrl = SimpleScit::new(SliceTuple::full(&shape), 5.0);
        let grid = grid_with_hot_band(shape, 0..25);

        let first = ctrl.step(0, &grid);
        assert_eq!(first.to_add.len(), 1);
        ctrl.ack_added(&[JobId(3)]);

        let second = ctrl.step(1_000_000, &grid);
        assert_eq!(second.to_reset.len(), 1);
        assert_eq!(second.to_reset[0].0, JobId(3));
        assert!(second.to_remove.is_empty());
    }

    #[test]
    fn dissipated_feature_ends_its_track() {
        let shape = [1usize, 30, 100];
        let mut ctrl = SimpleScit::new(SliceTuple::full(&shape), 5.0);
        let grid = grid_with_hot_band(shape, 0..25);
        ctrl.step(0, &grid);
        ctrl.ack_added(&[JobId(9)]);

        let cold = Grid3::filled(shape, 0.0);
        let second = ctrl.step(1_000_000, &cold);
        assert_eq!(second.to_remove, vec![JobId(9)]);
    }

    #[test]
    fn greedy_tracker_matches_nearest_cell_within_threshold() {
        let mut tracker = GreedyCentroidTracker::default();
        let vol0 = ScitVolume { frame_num: 0, vol_time: 0, storm_cells: vec![StormCell { x: 0.0, y: 0.0, id: 0 }] };
        let first = tracker.step(&vol0, 10.0);
        assert_eq!(first.tracks_to_add.len(), 1);
        let tid = first.tracks_to_add[0];

        let vol1 = ScitVolume { frame_num: 1, vol_time: 1, storm_cells: vec![StormCell { x: 3.0, y: 0.0, id: 0 }] };
        let second = tracker.step(&vol1, 10.0);
        assert_eq!(second.tracks_to_keep, vec![tid]);
    }
}
