//! [`ChunkIter`]: picks the single axis to subdivide by radial-count budget
//! and tiles it, leaving every other axis — and always the last axis —
//! whole.

use crate::error::RadsimError;
use crate::iter::base::{tiled_axis, BaseNDIter};
use crate::slice::{Slice, SliceTuple};

/// Builds a [`BaseNDIter`] that tiles a grid region into chunks of
/// approximately `chunk` radials each.
///
/// Chunking is restricted to step-1 (or step-(-1)) axes, since the inputs
/// this is built for — grid shapes and detected-feature bounding boxes —
/// are always unit-stride.
pub struct ChunkIter;

impl ChunkIter {
    /// `shape` is the full grid shape. `restrict`, if given, narrows the
    /// region to tile (defaults to the full grid). The last axis is never
    /// chunked: it is always emitted whole (the restricting slice, or the
    /// full axis if no restriction was given).
    pub fn build(
        shape: &[usize],
        chunk: usize,
        restrict: Option<SliceTuple>,
    ) -> Result<BaseNDIter, RadsimError> {
        let invalid = || RadsimError::InvalidChunk { chunk, shape: shape.to_vec() };

        if chunk == 0 || shape.len() < 2 {
            return Err(invalid());
        }

        let restrict_slices: Vec<Slice> = match restrict {
            Some(r) => r.0,
            None => shape.iter().map(|&n| Slice::full(n)).collect(),
        };
        debug_assert_eq!(restrict_slices.len(), shape.len());

        let rank = shape.len();
        let last = rank - 1;
        let lens: Vec<usize> = restrict_slices.iter().map(Slice::count).collect();

        let mut any_fits = false;
        let mut exact: Option<(usize, usize)> = None;
        let mut best: Option<(usize, usize, f64)> = None;

        for axis in 0..last {
            let len = lens[axis];
            if len == 0 || chunk > len {
                continue;
            }
            let fits = len / chunk;
            let extra = len % chunk;
            any_fits = true;

            if extra == 0 {
                exact.get_or_insert((axis, fits));
                continue;
            }

            let packing = (extra + chunk * fits) as f64 / (chunk * (fits + 1)) as f64;
            if best.is_none_or(|(_, _, bp)| packing > bp) {
                best = Some((axis, fits + 1, packing));
            }
        }

        if !any_fits {
            return Err(invalid());
        }

        let (picked_axis, count) = exact.or(best.map(|(a, c, _)| (a, c))).ok_or_else(invalid)?;

        let mut axes: Vec<Vec<Slice>> = Vec::with_capacity(rank);
        for axis in 0..rank {
            if axis == last {
                axes.push(vec![restrict_slices[last]]);
            } else if axis == picked_axis {
                axes.push(tiled_axis(&restrict_slices[axis], chunk, count));
            } else {
                axes.push(vec![restrict_slices[axis]]);
            }
        }

        let mut cycle_order = vec![picked_axis];
        cycle_order.extend((0..rank).filter(|&a| a != picked_axis));

        Ok(BaseNDIter::new(axes, cycle_order, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_chunk() {
        assert!(ChunkIter::build(&[40, 5, 1000], 0, None).is_err());
    }

    #[test]
    fn rejects_rank_below_two() {
        assert!(ChunkIter::build(&[40], 5, None).is_err());
    }

    #[test]
    fn rejects_chunk_larger_than_every_axis() {
        assert!(ChunkIter::build(&[3, 2, 1000], 50, None).is_err());
    }

    #[test]
    fn perfect_fit_picks_exact_axis() {
        // Scenario 1 from spec.md §8: grid (40, 5, 1000), chunk 20.
        let it = ChunkIter::build(&[40, 5, 1000], 20, None).unwrap();
        assert_eq!(it.cycle_len(), 2);
        let tuples: Vec<_> = it.take(2).collect();
        assert_eq!(tuples[0].0[0], Slice { start: 0, stop: 20, step: 1 });
        assert_eq!(tuples[1].0[0], Slice { start: 20, stop: 40, step: 1 });
        // Axis 1 and 2 are always whole.
        assert_eq!(tuples[0].0[1], Slice { start: 0, stop: 5, step: 1 });
        assert_eq!(tuples[0].0[2], Slice { start: 0, stop: 1000, step: 1 });
    }

    #[test]
    fn uneven_fit_last_group_takes_remainder() {
        let it = ChunkIter::build(&[9, 92, 1000], 5, None).unwrap();
        // axis 1 (92) has extra = 2, axis 0 (9) has fits=0 (chunk>len skip).
        assert_eq!(it.cycle_len(), 19);
        let tuples: Vec<_> = it.take(19).collect();
        let last = tuples.last().unwrap();
        assert_eq!(last.0[1], Slice { start: 90, stop: 92, step: 1 });
    }

    #[test]
    fn tiling_covers_region_exactly_no_gaps_no_overlap() {
        let it = ChunkIter::build(&[40, 5, 1000], 7, None).unwrap();
        let n = it.cycle_len();
        let mut covered: Vec<(usize, usize)> = Vec::new();
        for t in it.take(n) {
            let s = t.0[0];
            covered.push((s.start, s.stop));
        }
        covered.sort();
        let mut expect_start = 0;
        for (start, stop) in &covered {
            assert_eq!(*start, expect_start);
            expect_start = *stop;
        }
        assert_eq!(expect_start, 40);
    }
}
