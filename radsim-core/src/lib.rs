//! `radsim-core`: a discrete-event simulator for an adaptive-sensing
//! phased-array weather radar.
//!
//! The simulated clock, job model, and scheduler are independent of wall
//! time — a driver (the `radsim-cli` binary, or a test) advances the
//! [`scheduler::TaskScheduler`] and [`simulator::Simulator`] by explicit
//! microsecond deltas and polls an [`controller::Controller`] between
//! ticks to adapt the scan pattern to what the last volume showed.

pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod iter;
pub mod job;
pub mod scheduler;
pub mod simulator;
pub mod slice;
pub mod task;
pub mod time;

pub mod prelude;

pub use error::{RadsimError, Result};
