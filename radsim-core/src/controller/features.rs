//! Connected-component labeling over a reflectivity grid, the detection
//! primitive every `Simple*`/`SimpleTracking`/`SCITish` controller builds
//! on. Mirrors `scipy.ndimage.measurements.label`/`find_objects` from
//! `AdaptSys.py`'s `SimpleSensingSys`, generalized to 3-D.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::grid::Grid3;
use crate::slice::{Slice, SliceTuple};

/// One connected component of cells at or above the detection threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Bounding-box region, one `Slice` per grid axis. In 2-D mode the
    /// range-gate axis is always the full axis (the projection collapses
    /// it); in 3-D mode it is the component's actual range extent.
    pub bbox: SliceTuple,
    /// Product of the non-range-gate extents of `bbox`.
    pub radial_count: usize,
    /// Azimuth extent of `bbox`.
    pub azimuth_width: usize,
    /// Maximum raw reflectivity value anywhere in the component.
    pub max_value: f32,
    /// Label-weighted center of mass over `(elevation, azimuth)`, used by
    /// `SCITish` to build a storm cell's tracker centroid.
    pub centroid: (f64, f64),
}

fn weighted_centroid(points: &[((usize, usize), f32)]) -> (f64, f64) {
    let total: f64 = points.iter().map(|&(_, v)| v as f64).sum();
    if total <= 0.0 {
        let n = points.len() as f64;
        let (se, sa) = points.iter().fold((0.0, 0.0), |(se, sa), &((e, a), _)| (se + e as f64, sa + a as f64));
        return (se / n, sa / n);
    }
    let (se, sa) = points.iter().fold((0.0, 0.0), |(se, sa), &((e, a), v)| (se + e as f64 * v as f64, sa + a as f64 * v as f64));
    (se / total, sa / total)
}

/// Label connected components of `grid` at or above `threshold`, restricted
/// to `volume`. `three_d` selects 6-connectivity over the full
/// `(elevation, azimuth, range_gate)` volume; otherwise labeling runs on
/// the azimuth-elevation projection (`max` over range gates, NaN-ignoring)
/// with 4-connectivity, and every component's range axis spans the whole
/// grid.
pub fn label_components(grid: &Grid3, volume: &SliceTuple, threshold: f32, three_d: bool) -> Vec<Component> {
    if three_d {
        label_3d(grid, volume, threshold)
    } else {
        label_2d(grid, volume, threshold)
    }
}

fn label_2d(grid: &Grid3, volume: &SliceTuple, threshold: f32) -> Vec<Component> {
    let shape = grid.shape();
    let mut projected: HashMap<(usize, usize), f32> = HashMap::new();
    for (e, a, g) in Grid3::coords_in(&shape, volume) {
        let value = grid.get(e, a, g);
        if value.is_nan() {
            continue;
        }
        projected.entry((e, a)).and_modify(|m| *m = m.max(value)).or_insert(value);
    }

    let live: HashSet<(usize, usize)> = projected.iter().filter(|&(_, &v)| v >= threshold).map(|(&k, _)| k).collect();

    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut components = Vec::new();
    for &seed in &live {
        if visited.contains(&seed) {
            continue;
        }
        let mut queue = VecDeque::from([seed]);
        visited.insert(seed);
        let mut coords = Vec::new();
        while let Some((e, a)) = queue.pop_front() {
            coords.push((e, a));
            for (de, da) in [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)] {
                let ne = e as i64 + de;
                let na = a as i64 + da;
                if ne < 0 || na < 0 {
                    continue;
                }
                let neighbor = (ne as usize, na as usize);
                if live.contains(&neighbor) && visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        let e_min = coords.iter().map(|&(e, _)| e).min().unwrap();
        let e_max = coords.iter().map(|&(e, _)| e).max().unwrap();
        let a_min = coords.iter().map(|&(_, a)| a).min().unwrap();
        let a_max = coords.iter().map(|&(_, a)| a).max().unwrap();
        let max_value = coords.iter().map(|c| projected[c]).fold(f32::MIN, f32::max);
        let weighted: Vec<_> = coords.iter().map(|&c| (c, projected[&c])).collect();
        let centroid = weighted_centroid(&weighted);

        let bbox = SliceTuple(vec![
            Slice { start: e_min, stop: e_max + 1, step: 1 },
            Slice { start: a_min, stop: a_max + 1, step: 1 },
            Slice::full(shape[2]),
        ]);
        components.push(Component {
            radial_count: bbox.radial_count(),
            azimuth_width: bbox.azimuth_width(),
            bbox,
            max_value,
            centroid,
        });
    }
    components
}

fn label_3d(grid: &Grid3, volume: &SliceTuple, threshold: f32) -> Vec<Component> {
    let shape = grid.shape();
    let live: HashSet<(usize, usize, usize)> = Grid3::coords_in(&shape, volume)
        .filter(|&(e, a, g)| grid.get(e, a, g) >= threshold)
        .collect();

    let mut visited: HashSet<(usize, usize, usize)> = HashSet::new();
    let mut components = Vec::new();
    for &seed in &live {
        if visited.contains(&seed) {
            continue;
        }
        let mut queue = VecDeque::from([seed]);
        visited.insert(seed);
        let mut coords = Vec::new();
        while let Some((e, a, g)) = queue.pop_front() {
            coords.push((e, a, g));
            for (de, da, dg) in [(-1i64, 0i64, 0i64), (1, 0, 0), (0, -1, 0), (0, 1, 0), (0, 0, -1), (0, 0, 1)] {
                let ne = e as i64 + de;
                let na = a as i64 + da;
                let ng = g as i64 + dg;
                if ne < 0 || na < 0 || ng < 0 {
                    continue;
                }
                let neighbor = (ne as usize, na as usize, ng as usize);
                if live.contains(&neighbor) && visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        let e_min = coords.iter().map(|&(e, _, _)| e).min().unwrap();
        let e_max = coords.iter().map(|&(e, _, _)| e).max().unwrap();
        let a_min = coords.iter().map(|&(_, a, _)| a).min().unwrap();
        let a_max = coords.iter().map(|&(_, a, _)| a).max().unwrap();
        let g_min = coords.iter().map(|&(_, _, g)| g).min().unwrap();
        let g_max = coords.iter().map(|&(_, _, g)| g).max().unwrap();
        let max_value = coords.iter().map(|&(e, a, g)| grid.get(e, a, g)).fold(f32::MIN, f32::max);
        let weighted: Vec<_> = coords.iter().map(|&(e, a, g)| ((e, a), grid.get(e, a, g))).collect();
        let centroid = weighted_centroid(&weighted);

        let bbox = SliceTuple(vec![
            Slice { start: e_min, stop: e_max + 1, step: 1 },
            Slice { start: a_min, stop: a_max + 1, step: 1 },
            Slice { start: g_min, stop: g_max + 1, step: 1 },
        ]);
        components.push(Component {
            radial_count: bbox.radial_count(),
            azimuth_width: bbox.azimuth_width(),
            bbox,
            max_value,
            centroid,
        });
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(shape: [usize; 3], hot: &[(usize, usize, usize)], value: f32) -> Grid3 {
        let mut grid = Grid3::filled(shape, 0.0);
        for &(e, a, g) in hot {
            grid.set(e, a, g, value);
        }
        grid
    }

    #[test]
    fn two_d_merges_adjacent_radials_into_one_component() {
        let shape = [1usize, 5, 10];
        let hot: Vec<_> = (0..5).map(|a| (0, a, 0)).collect();
        let grid = grid_with(shape, &hot, 40.0);
        let comps = label_components(&grid, &SliceTuple::full(&shape), 35.0, false);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].azimuth_width, 5);
        assert_eq!(comps[0].bbox.0[2], Slice::full(10));
    }

    #[test]
    fn two_d_keeps_disjoint_regions_separate() {
        let shape = [1usize, 10, 10];
        let mut hot = vec![(0usize, 0usize, 0usize)];
        hot.push((0, 8, 0));
        let grid = grid_with(shape, &hot, 40.0);
        let comps = label_components(&grid, &SliceTuple::full(&shape), 35.0, false);
        assert_eq!(comps.len(), 2);
    }

    #[test]
    fn three_d_bbox_tracks_actual_range_extent() {
        let shape = [1usize, 1, 10];
        let hot = [(0usize, 0usize, 2usize), (0, 0, 3), (0, 0, 4)];
        let grid = grid_with(shape, &hot, 50.0);
        let comps = label_components(&grid, &SliceTuple::full(&shape), 35.0, true);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].bbox.0[2], Slice { start: 2, stop: 5, step: 1 });
    }

    #[test]
    fn below_threshold_yields_no_components() {
        let shape = [2usize, 2, 2];
        let grid = Grid3::filled(shape, 10.0);
        let comps = label_components(&grid, &SliceTuple::full(&shape), 35.0, false);
        assert!(comps.is_empty());
    }

    #[test]
    fn max_value_reports_peak_in_component() {
        let shape = [1usize, 3, 5];
        let grid = grid_with(shape, &[(0, 0, 0), (0, 1, 2)], 60.0);
        // sparsify: make (0,1,*) the peak
        let mut grid = grid;
        grid.set(0, 0, 0, 36.0);
        let comps = label_components(&grid, &SliceTuple::full(&shape), 35.0, false);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].max_value, 60.0);
    }
}
