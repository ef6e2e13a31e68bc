//! [`SliceIter`]: builds a cyclic [`BaseNDIter`] directly from per-axis
//! `(start, stop, step)` triples, the way a job's radial iterator walks
//! single elevation/azimuth positions.

use crate::iter::base::{single_index_axis, BaseNDIter};

/// Convenience constructor for a [`BaseNDIter`] whose per-axis chunk lists
/// are single-index slices from `start` to `stop`, stepping by
/// `step.unsigned_abs()`, ordered so that iterating the axis list in
/// increasing cursor order follows the sign of the requested `step`
/// (ascending for positive, descending for negative).
pub struct SliceIter;

impl SliceIter {
    /// `starts`, `stops`, `steps` must all have the same length (one entry
    /// per axis). `cycle_order` is a permutation of `0..starts.len()`,
    /// innermost axis first. The resulting iterator cycles forever.
    pub fn build(
        starts: &[usize],
        stops: &[usize],
        steps: &[isize],
        axis_sizes: &[usize],
        cycle_order: Vec<usize>,
    ) -> BaseNDIter {
        debug_assert_eq!(starts.len(), stops.len());
        debug_assert_eq!(starts.len(), steps.len());
        debug_assert_eq!(starts.len(), axis_sizes.len());

        let axes = (0..starts.len())
            .map(|axis| single_index_axis(starts[axis], stops[axis], steps[axis], axis_sizes[axis]))
            .collect();

        BaseNDIter::new(axes, cycle_order, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_ascending_step() {
        let it = SliceIter::build(&[0], &[4], &[1], &[4], vec![0]);
        let tuples: Vec<_> = it.take(4).map(|t| t.0[0].start).collect();
        assert_eq!(tuples, vec![0, 1, 2, 3]);
    }

    #[test]
    fn build_descending_step_reverses_order() {
        let it = SliceIter::build(&[0], &[4], &[-1], &[4], vec![0]);
        let tuples: Vec<_> = it.take(4).map(|t| t.0[0].start).collect();
        assert_eq!(tuples, vec![3, 2, 1, 0]);
    }

    #[test]
    fn cycles_forever() {
        let it = SliceIter::build(&[0], &[2], &[1], &[2], vec![0]);
        let tuples: Vec<_> = it.take(5).map(|t| t.0[0].start).collect();
        assert_eq!(tuples, vec![0, 1, 0, 1, 0]);
    }
}
