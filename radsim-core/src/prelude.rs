//! Common re-exports for driving a simulation: `use radsim_core::prelude::*;`.

pub use crate::config::SimConfig;
pub use crate::controller::{AdaptStep, Controller, ControllerRegistry};
pub use crate::error::{RadsimError, Result};
pub use crate::grid::Grid3;
pub use crate::iter::{BaseNDIter, ChunkIter, SliceIter};
pub use crate::job::{ScanJob, StaticJob, Surveillance, Vcp};
pub use crate::scheduler::TaskScheduler;
pub use crate::simulator::{Simulator, VolumeFrame};
pub use crate::slice::{Slice, SliceTuple};
pub use crate::task::{JobId, ScanOperation};
pub use crate::time::{Duration, Ratio, MAX_DURATION};
