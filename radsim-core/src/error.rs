//! Crate-wide error type.
//!
//! Every fallible operation in `radsim-core` returns `Result<T, RadsimError>`.
//! There is no retry logic anywhere in this crate: errors propagate to the
//! driver (the CLI or an embedding test) and are not recovered internally.

use thiserror::Error;

/// All error kinds produced by the simulator core.
#[derive(Debug, Clone, Error)]
pub enum RadsimError {
    /// `ChunkIter` was given a chunk size that does not fit any axis, or a
    /// chunk size `<= 0`, or a grid with rank `< 2`.
    #[error("invalid chunk size {chunk} for shape {shape:?}")]
    InvalidChunk {
        /// The chunk size that was rejected.
        chunk: usize,
        /// The grid shape it was evaluated against.
        shape: Vec<usize>,
    },

    /// The simulator was constructed with fewer than two reflectivity
    /// volumes; interpolation requires a current and a next frame.
    #[error("simulator requires at least 2 volume frames, got {0}")]
    InsufficientFrames(usize),

    /// `TaskScheduler::add_active` was called with every slot occupied.
    #[error("no free slot among {concurrent_max} active task slots")]
    NoFreeSlot {
        /// Configured slot count.
        concurrent_max: usize,
    },

    /// `TaskScheduler::remove_jobs` referenced a job id that was never
    /// registered with `add_jobs`.
    #[error("unknown job id {0}")]
    UnknownJob(u64),

    /// `ControllerRegistry::register` was called with a name that already
    /// has a constructor registered.
    #[error("duplicate controller name: {0}")]
    DuplicateName(String),

    /// Configuration file could not be parsed or failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RadsimError>;
