//! `Null`, `Simple`, `SimpleVol`, `SimplePPI`: stateless-identity feature
//! detectors. Each step re-detects from scratch and replaces its whole
//! previous batch of jobs, mirroring `AdaptSys.py`'s `SimpleSensingSys`
//! (`self.prevTasks = tasksToAdd` every call, no cross-step association).

use crate::controller::features::{label_components, Component};
use crate::controller::{AdaptStep, Controller};
use crate::grid::Grid3;
use crate::iter::ChunkIter;
use crate::job::StaticJob;
use crate::slice::SliceTuple;
use crate::task::JobId;
use crate::time::Duration;

/// +35 dBZ, matching `AdaptSys.py`'s literal threshold.
const DETECTION_THRESHOLD: f32 = 35.0;
/// Too weak to bother re-scanning; only applied by the `Simple` variant.
const WEAK_ECHO_THRESHOLD: f32 = 40.0;
/// Too small a footprint to bother re-scanning.
const MIN_RADIAL_COUNT: usize = 20;
/// Azimuth chunk width used to tile a detected feature's bounding box,
/// matching the WSR-88D radial-batch granularity every VCP job uses.
const FEATURE_CHUNK_WIDTH: usize = 5;
/// Revisit cadence requested for a freshly-detected feature.
const FEATURE_UPDATE_PERIOD: Duration = Duration::from_micros(20_000_000);
const FEATURE_DWELL: Duration = Duration::from_micros(64_000);
const FEATURE_PRT: Duration = Duration::from_micros(800);

/// Shared detect-and-replace logic behind `Simple`/`SimpleVol`/`SimplePPI`.
/// `three_d` selects the labeling mode; `weak_echo_filter` selects whether
/// the `max reflectivity < 40 dBZ` discard applies.
#[derive(Debug)]
struct Detector {
    volume: SliceTuple,
    three_d: bool,
    weak_echo_filter: bool,
    prev_ids: Vec<JobId>,
}

impl Detector {
    fn new(volume: SliceTuple, three_d: bool, weak_echo_filter: bool) -> Self {
        Detector { volume, three_d, weak_echo_filter, prev_ids: Vec::new() }
    }

    fn survivors(&self, grid: &Grid3) -> Vec<Component> {
        label_components(grid, &self.volume, DETECTION_THRESHOLD, self.three_d)
            .into_iter()
            .filter(|c| c.radial_count >= MIN_RADIAL_COUNT)
            .filter(|c| !self.weak_echo_filter || c.max_value >= WEAK_ECHO_THRESHOLD)
            .collect()
    }

    fn step(&mut self, grid: &Grid3) -> AdaptStep {
        let to_remove = std::mem::take(&mut self.prev_ids);
        let shape = grid.shape();
        let to_add = self
            .survivors(grid)
            .into_iter()
            .filter_map(|c| {
                let radials = ChunkIter::build(&shape, FEATURE_CHUNK_WIDTH, Some(c.bbox)).ok()?;
                Some(Box::new(StaticJob::new(radials, FEATURE_DWELL, FEATURE_PRT, FEATURE_UPDATE_PERIOD)) as Box<dyn crate::job::ScanJob>)
            })
            .collect();
        AdaptStep { to_add, to_remove, to_reset: Vec::new() }
    }

    fn ack_added(&mut self, ids: &[JobId]) {
        self.prev_ids = ids.to_vec();
    }
}

/// Adapts nothing; always `([], [])`.
#[derive(Debug, Default)]
pub struct Null;

impl Controller for Null {
    fn step(&mut self, _now: u64, _grid: &Grid3) -> AdaptStep {
        AdaptStep::empty()
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// 2-D detection with both the minimum-size and weak-echo filters applied.
#[derive(Debug)]
pub struct Simple(Detector);

impl Simple {
    /// `volume` restricts detection to a sub-region of the grid.
    pub fn new(volume: SliceTuple) -> Self {
        Simple(Detector::new(volume, false, true))
    }
}

impl Controller for Simple {
    fn step(&mut self, _now: u64, grid: &Grid3) -> AdaptStep {
        self.0.step(grid)
    }

    fn ack_added(&mut self, ids: &[JobId]) {
        self.0.ack_added(ids);
    }

    fn name(&self) -> &'static str {
        "simple"
    }
}

/// 3-D detection (6-connectivity), no weak-echo filter.
#[derive(Debug)]
pub struct SimpleVol(Detector);

impl SimpleVol {
    /// `volume` restricts detection to a sub-region of the grid.
    pub fn new(volume: SliceTuple) -> Self {
        SimpleVol(Detector::new(volume, true, false))
    }
}

impl Controller for SimpleVol {
    fn step(&mut self, _now: u64, grid: &Grid3) -> AdaptStep {
        self.0.step(grid)
    }

    fn ack_added(&mut self, ids: &[JobId]) {
        self.0.ack_added(ids);
    }

    fn name(&self) -> &'static str {
        "simple_vol"
    }
}

/// 2-D detection (single-elevation-plane style), no weak-echo filter.
#[derive(Debug)]
pub struct SimplePpi(Detector);

impl SimplePpi {
    /// `volume` restricts detection to a sub-region of the grid.
    pub fn new(volume: SliceTuple) -> Self {
        SimplePpi(Detector::new(volume, false, false))
    }
}

impl Controller for SimplePpi {
    fn step(&mut self, _now: u64, grid: &Grid3) -> AdaptStep {
        self.0.step(grid)
    }

    fn ack_added(&mut self, ids: &[JobId]) {
        self.0.ack_added(ids);
    }

    fn name(&self) -> &'static str {
        "simple_ppi"
    }
}
