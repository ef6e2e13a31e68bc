//! N-D chunked iteration with an explicit, cloneable cursor.
//!
//! [`BaseNDIter`] is the engine behind both [`crate::iter::SliceIter`] and
//! [`crate::iter::ChunkIter`]: given, per axis, a finite list of candidate
//! [`Slice`] chunks and a traversal order over axes, it walks the Cartesian
//! product of chunk indices, carrying into the next axis in the order
//! whenever the current one wraps.

use crate::slice::{Slice, SliceTuple};

/// Cyclic, carry-chain iterator over the Cartesian product of per-axis
/// chunk lists.
///
/// The cursor is plain data (`Vec<usize>`), so `Clone` gives an independent
/// "peek the remaining schedule" snapshot without perturbing the live
/// iterator — this is what [`crate::job`]'s `time_for_job` helper relies on.
#[derive(Debug, Clone)]
pub struct BaseNDIter {
    /// Per-axis chunk lists, one `Slice` per chunk index.
    axes: Vec<Vec<Slice>>,
    /// Axis indices in traversal order, innermost (fastest-varying) first.
    cycle_order: Vec<usize>,
    /// Current chunk index per axis, in original axis order.
    cursor: Vec<usize>,
    /// Whether to wrap back to all-zero and continue forever once the
    /// outermost axis in `cycle_order` wraps.
    do_cycle: bool,
    /// `true` once a non-cycling iterator has emitted its last tuple.
    exhausted: bool,
}

impl BaseNDIter {
    /// Build a new iterator. `axes[i]` must be non-empty for every `i`.
    /// `cycle_order` must be a permutation of `0..axes.len()`.
    pub fn new(axes: Vec<Vec<Slice>>, cycle_order: Vec<usize>, do_cycle: bool) -> Self {
        debug_assert_eq!(cycle_order.len(), axes.len());
        debug_assert!(axes.iter().all(|a| !a.is_empty()));
        let cursor = vec![0usize; axes.len()];
        BaseNDIter { axes, cycle_order, cursor, do_cycle, exhausted: false }
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    /// Per-axis chunk counts.
    pub fn chunk_counts(&self) -> Vec<usize> {
        self.axes.iter().map(Vec::len).collect()
    }

    /// Total number of distinct tuples in one full cycle (product of
    /// per-axis chunk counts).
    pub fn cycle_len(&self) -> usize {
        self.axes.iter().map(Vec::len).product()
    }

    /// Current cursor position, for tests and diagnostics.
    pub fn cursor(&self) -> &[usize] {
        &self.cursor
    }

    fn current_tuple(&self) -> SliceTuple {
        SliceTuple(
            (0..self.axes.len())
                .map(|axis| self.axes[axis][self.cursor[axis]])
                .collect(),
        )
    }

    /// Advance the cursor by one step along `cycle_order`, carrying into
    /// subsequent axes as each wraps. Returns `false` (and sets
    /// `exhausted`) if the outermost axis wrapped and `do_cycle` is false.
    fn advance(&mut self) -> bool {
        for &axis in &self.cycle_order {
            self.cursor[axis] += 1;
            if self.cursor[axis] < self.axes[axis].len() {
                return true;
            }
            self.cursor[axis] = 0;
            // carries into the next axis in cycle_order
        }
        // every axis wrapped: one full cycle completed
        self.do_cycle
    }
}

impl Iterator for BaseNDIter {
    type Item = SliceTuple;

    fn next(&mut self) -> Option<SliceTuple> {
        if self.exhausted {
            return None;
        }
        let tuple = self.current_tuple();
        if !self.advance() {
            self.exhausted = true;
        }
        Some(tuple)
    }
}

/// Single-index chunks from `start` to `stop`, stepping by
/// `step.unsigned_abs()`, ordered to follow the sign of `step`. Shared by
/// [`crate::iter::slice_iter`] and [`crate::job`]'s radial iterator
/// construction.
pub(crate) fn single_index_axis(start: usize, stop: usize, step: isize, axis_size: usize) -> Vec<Slice> {
    debug_assert!(step != 0);
    let stride = step.unsigned_abs();
    let mut positions = Vec::new();
    let mut pos = start;
    while pos < stop {
        positions.push(pos);
        pos += stride;
    }
    if step < 0 {
        positions.reverse();
    }
    if positions.is_empty() {
        positions.push(start.min(axis_size.saturating_sub(1)));
    }
    positions
        .into_iter()
        .map(|p| Slice::normalized(p, p + 1, step, axis_size))
        .collect()
}

/// Split `slice` into `count` consecutive groups of `chunk` elements each,
/// with the final group taking whatever remains. Shared by
/// [`crate::iter::chunk_iter`] and [`crate::job::Surveillance`].
pub(crate) fn tiled_axis(slice: &Slice, chunk: usize, count: usize) -> Vec<Slice> {
    let sign = slice.step;
    let mut groups = Vec::with_capacity(count);
    let mut pos = slice.start;
    for i in 0..count {
        let width = if i + 1 == count { slice.stop - pos } else { chunk };
        groups.push(Slice { start: pos, stop: pos + width, step: sign });
        pos += width;
    }
    groups
}
