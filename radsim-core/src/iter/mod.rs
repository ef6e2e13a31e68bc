//! N-D chunked slice iteration over a radar grid.

pub mod base;
pub mod chunk_iter;
pub mod slice_iter;

pub use base::BaseNDIter;
pub use chunk_iter::ChunkIter;
pub use slice_iter::SliceIter;
