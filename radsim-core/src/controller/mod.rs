//! Adaptive-sensing controllers: the `Null`/`Simple`/`SimpleVol`/`SimplePPI`/
//! `SimpleTracking`/`SCITish` family, plus a process-wide name registry.
//!
//! Every controller is a pure function of `(now, grid)` to a set of job
//! deltas; it never touches the scheduler directly. The driver is
//! responsible for applying `to_add`/`to_remove`/`to_reset` to a
//! [`crate::scheduler::TaskScheduler`] and feeding the ids assigned to
//! `to_add` back via [`Controller::ack_added`] so tracking controllers can
//! associate future overlap against the right [`JobId`].

mod features;
mod scit;
mod simple;
mod tracking;

pub use features::{label_components, Component};
pub use scit::{ScitTracker, SimpleScit, TrackDelta};
pub use simple::{Null, Simple, SimplePpi, SimpleVol};
pub use tracking::SimpleTracking;

use std::collections::HashMap;

use crate::error::RadsimError;
use crate::grid::Grid3;
use crate::job::ScanJob;
use crate::slice::SliceTuple;
use crate::task::JobId;

/// The result of one controller step: jobs to register and activate, jobs
/// to mark for (deferred) removal, and jobs whose radial iterator should be
/// replaced in place without losing identity.
#[derive(Debug, Default)]
pub struct AdaptStep {
    /// Freshly-built jobs the driver should register via `add_jobs`.
    pub to_add: Vec<Box<dyn ScanJob>>,
    /// Previously-registered jobs the driver should pass to `remove_jobs`.
    pub to_remove: Vec<JobId>,
    /// Previously-registered jobs the driver should pass to `reset_job`,
    /// paired with their new radial iterator.
    pub to_reset: Vec<(JobId, crate::iter::BaseNDIter)>,
}

impl AdaptStep {
    fn empty() -> Self {
        AdaptStep::default()
    }
}

/// Shared capability over the controller family. `step` never sees a
/// [`JobId`] for the jobs it proposes in `to_add` — the scheduler assigns
/// those only once `add_jobs` runs — so a tracking controller records them
/// afterwards via `ack_added`.
pub trait Controller: std::fmt::Debug {
    /// Inspect the current grid and propose job deltas.
    fn step(&mut self, now: u64, grid: &Grid3) -> AdaptStep;

    /// Called by the driver immediately after `add_jobs` registers the
    /// jobs from the most recent `step`'s `to_add`, in the same order, so
    /// the controller can remember which [`JobId`] belongs to which
    /// feature. Controllers that don't track identity across steps (e.g.
    /// [`Null`], [`Simple`]) can ignore this.
    fn ack_added(&mut self, _ids: &[JobId]) {}

    /// Human-readable controller kind, for logging and the registry.
    fn name(&self) -> &'static str;
}

type Constructor = Box<dyn Fn(SliceTuple, &HashMap<String, String>) -> Box<dyn Controller> + Send + Sync>;

/// Process-wide `name -> constructor` table. `register` fails on a name
/// collision; `adapt` looks a name up and builds a fresh controller scoped
/// to `bounding_volume`.
#[derive(Default)]
pub struct ControllerRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ControllerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        ControllerRegistry { constructors: HashMap::new() }
    }

    /// A registry pre-populated with the six built-in controllers
    /// (`"null"`, `"simple"`, `"simple_vol"`, `"simple_ppi"`,
    /// `"simple_tracking"`, `"scit"`).
    pub fn with_builtins() -> Self {
        let mut registry = ControllerRegistry::new();
        registry.register("null", |_vol, _opts| Box::new(Null)).expect("builtin names are unique");
        registry
            .register("simple", |vol, _opts| Box::new(Simple::new(vol)))
            .expect("builtin names are unique");
        registry
            .register("simple_vol", |vol, _opts| Box::new(SimpleVol::new(vol)))
            .expect("builtin names are unique");
        registry
            .register("simple_ppi", |vol, _opts| Box::new(SimplePpi::new(vol)))
            .expect("builtin names are unique");
        registry
            .register("simple_tracking", |vol, _opts| Box::new(SimpleTracking::new(vol)))
            .expect("builtin names are unique");
        registry
            .register("scit", |vol, opts| {
                let speed_thresh: f64 = opts.get("speed_thresh").and_then(|v| v.parse().ok()).unwrap_or(25.0);
                Box::new(SimpleScit::new(vol, speed_thresh))
            })
            .expect("builtin names are unique");
        registry
    }

    /// Register a constructor under `name`. Fails with
    /// [`RadsimError::DuplicateName`] if `name` is already taken.
    pub fn register<F>(&mut self, name: &str, ctor: F) -> Result<(), RadsimError>
    where
        F: Fn(SliceTuple, &HashMap<String, String>) -> Box<dyn Controller> + Send + Sync + 'static,
    {
        if self.constructors.contains_key(name) {
            return Err(RadsimError::DuplicateName(name.to_string()));
        }
        self.constructors.insert(name.to_string(), Box::new(ctor));
        Ok(())
    }

    /// Build a controller by registry name, scoped to `bounding_volume`
    /// with the given string options. Returns `None` if `name` isn't
    /// registered.
    pub fn adapt(&self, name: &str, bounding_volume: SliceTuple, opts: &HashMap<String, String>) -> Option<Box<dyn Controller>> {
        self.constructors.get(name).map(|ctor| ctor(bounding_volume, opts))
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("names", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
