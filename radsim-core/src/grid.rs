//! Dense 3-D reflectivity grids (elevation x azimuth x range-gate).

use crate::slice::{Slice, SliceTuple};

/// A dense 3-D array of `f32` reflectivity values, row-major in
/// `(elevation, azimuth, range_gate)` order.
#[derive(Debug, Clone)]
pub struct Grid3 {
    shape: [usize; 3],
    data: Vec<f32>,
}

impl Grid3 {
    /// Build a grid of the given shape, filled with `fill`.
    pub fn filled(shape: [usize; 3], fill: f32) -> Self {
        let len = shape.iter().product();
        Grid3 { shape, data: vec![fill; len] }
    }

    /// Build a grid of the given shape, initialized to `NaN` (the working
    /// view's starting state before any task has written into it).
    pub fn nan(shape: [usize; 3]) -> Self {
        Grid3::filled(shape, f32::NAN)
    }

    /// The grid's shape.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    #[inline]
    fn index(&self, e: usize, a: usize, g: usize) -> usize {
        (e * self.shape[1] + a) * self.shape[2] + g
    }

    /// Read a single cell.
    pub fn get(&self, e: usize, a: usize, g: usize) -> f32 {
        self.data[self.index(e, a, g)]
    }

    /// Write a single cell.
    pub fn set(&mut self, e: usize, a: usize, g: usize, value: f32) {
        let idx = self.index(e, a, g);
        self.data[idx] = value;
    }

    /// Iterate `(elevation, azimuth, range_gate)` coordinates selected by a
    /// `SliceTuple`, honoring per-axis step.
    pub fn coords_in<'a>(shape: &'a [usize; 3], tuple: &'a SliceTuple) -> impl Iterator<Item = (usize, usize, usize)> + 'a {
        let e_iter = axis_positions(&tuple.0[0]);
        let a_iter = axis_positions(&tuple.0[1]);
        let g_iter = axis_positions(&tuple.0[2]);
        e_iter.flat_map(move |e| {
            let a_iter = a_iter.clone();
            let g_iter_outer = g_iter.clone();
            a_iter.flat_map(move |a| g_iter_outer.clone().map(move |g| (e, a, g)))
        })
    }

    /// Apply a linear-interpolated write of `curr + slope * dt_us` over the
    /// cells selected by `slice_tuple` (intersected with `bounding`), using
    /// flat per-cell `curr`/`slope` grids of identical shape. Returns the
    /// `(elevation, azimuth)` pairs touched, for `radial_age`/`update_count`
    /// bookkeeping.
    pub fn apply_interpolated(
        &mut self,
        curr: &Grid3,
        slope: &Grid3,
        slice_tuple: &SliceTuple,
        dt_us: f64,
    ) -> Vec<(usize, usize)> {
        let shape = self.shape;
        let mut touched = Vec::new();
        for (e, a, g) in Grid3::coords_in(&shape, slice_tuple) {
            let value = curr.get(e, a, g) + slope.get(e, a, g) * dt_us as f32;
            self.set(e, a, g, value);
            touched.push((e, a));
        }
        touched.sort_unstable();
        touched.dedup();
        touched
    }
}

fn axis_positions(slice: &Slice) -> impl Iterator<Item = usize> + Clone {
    let step = slice.step;
    let (start, stop) = (slice.start, slice.stop);
    AxisPositions { next: if step > 0 { Some(start) } else { stop.checked_sub(1) }, stop, start, step }
}

#[derive(Clone)]
struct AxisPositions {
    next: Option<usize>,
    start: usize,
    stop: usize,
    step: isize,
}

impl Iterator for AxisPositions {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        let cur = self.next?;
        if self.step > 0 {
            if cur >= self.stop {
                self.next = None;
                return None;
            }
            let step = self.step as usize;
            self.next = if cur + step < self.stop { Some(cur + step) } else { None };
        } else {
            if cur < self.start {
                self.next = None;
                return None;
            }
            let step = (-self.step) as usize;
            self.next = if cur >= self.start + step { Some(cur - step) } else { None };
        }
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_in_covers_full_grid() {
        let shape = [2usize, 3, 4];
        let tuple = SliceTuple::full(&shape);
        let coords: Vec<_> = Grid3::coords_in(&shape, &tuple).collect();
        assert_eq!(coords.len(), 2 * 3 * 4);
    }

    #[test]
    fn axis_positions_handles_negative_step() {
        let s = Slice::normalized(0, 5, -1, 10);
        let xs: Vec<usize> = axis_positions(&s).collect();
        assert_eq!(xs, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn apply_interpolated_writes_and_reports_touched() {
        let shape = [1usize, 2, 2];
        let curr = Grid3::filled(shape, 10.0);
        let slope = Grid3::filled(shape, 2.0);
        let mut out = Grid3::nan(shape);
        let tuple = SliceTuple::full(&shape);
        let touched = out.apply_interpolated(&curr, &slope, &tuple, 3.0);
        assert_eq!(touched.len(), 2);
        assert_eq!(out.get(0, 0, 0), 16.0);
    }
}
