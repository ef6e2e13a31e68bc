//! # radsim
//!
//! Driver binary for the `radsim-core` discrete-event scan-time simulator.
//! Loads a [`SimConfig`], seeds a scheduler with the configured jobs, runs
//! an adaptive-sensing controller from the registry against a synthetic
//! demo volume source for a fixed number of ticks, and prints a JSON QoS
//! summary.
//!
//! ```bash
//! radsim --config radsim.toml --ticks 20
//! ```

#![deny(warnings)]

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use radsim_core::config::{JobConfig, SimConfig};
use radsim_core::prelude::*;

/// radsim - discrete-event scan-time radar simulator
#[derive(Parser, Debug)]
#[command(name = "radsim")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Discrete-event scan-time scheduler and adaptive-sensing controller simulator")]
struct Args {
    /// Path to the simulation configuration file.
    #[arg(short, long, default_value = "radsim.toml")]
    config: PathBuf,

    /// Number of scheduler ticks to run.
    #[arg(short, long, default_value_t = 20)]
    ticks: u64,

    /// Simulated duration of one tick, in microseconds.
    #[arg(long, default_value_t = 1_000_000)]
    dt_us: u64,
}

fn main() {
    if let Err(e) = run() {
        error!("radsim run failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = SimConfig::load(&args.config)?;
    setup_tracing(config.log_level.as_tracing_level());

    info!(controller = %config.controller, ticks = args.ticks, "starting radsim run");

    let report = simulate(&args, &config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn setup_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Debug, serde::Serialize)]
struct QosReport {
    occupancy: f64,
    acquisition: f64,
    improve_factor: f64,
    max_time_over_us: u64,
    sum_time_over_us: u64,
    ticks_completed: u64,
}

fn simulate(args: &Args, config: &SimConfig) -> std::result::Result<QosReport, Box<dyn std::error::Error>> {
    let shape = config.grid.shape();
    let bounding_volume = SliceTuple::full(&shape);

    let mut scheduler = TaskScheduler::new(config.scheduler.concurrent_max, config.scheduler.ratio_denom);
    let seed_jobs: Vec<Box<dyn ScanJob>> =
        config.jobs.iter().map(|j| build_job(j, &shape)).collect::<std::result::Result<_, _>>()?;
    scheduler.add_jobs(seed_jobs);

    let registry = ControllerRegistry::with_builtins();
    let mut controller = registry
        .adapt(&config.controller, bounding_volume.clone(), &HashMap::new())
        .ok_or_else(|| format!("unknown controller '{}'", config.controller))?;

    let source = DemoVolumeSource::new(shape, args.dt_us, args.ticks + 2);
    let mut sim = Simulator::new(source)?;

    let mut ticks_completed = 0;
    for tick in 0..args.ticks {
        let now = tick * args.dt_us;

        let step = controller.step(now, sim.current_view());
        if !step.to_remove.is_empty() {
            scheduler.remove_jobs(&step.to_remove)?;
        }
        for (id, radials) in step.to_reset {
            scheduler.reset_job(id, radials)?;
        }
        if !step.to_add.is_empty() {
            let ids = scheduler.add_jobs(step.to_add);
            controller.ack_added(&ids);
        }

        scheduler.next_jobs(false);
        scheduler.increment_timer(Duration::from_micros(args.dt_us));

        if !sim.update(now, &mut scheduler, &bounding_volume)? {
            info!(tick, "volume source exhausted, stopping early");
            break;
        }
        ticks_completed += 1;
    }

    Ok(QosReport {
        occupancy: scheduler.occupancy(),
        acquisition: scheduler.acquisition(),
        improve_factor: scheduler.improve_factor(Duration::from_micros(args.dt_us)),
        max_time_over_us: scheduler.max_time_over.as_micros(),
        sum_time_over_us: scheduler.sum_time_over.as_micros(),
        ticks_completed,
    })
}

fn build_job(cfg: &JobConfig, shape: &[usize; 3]) -> std::result::Result<Box<dyn ScanJob>, Box<dyn std::error::Error>> {
    let dwell = Duration::from_micros(cfg.dwell_us);
    let prt = Duration::from_micros(cfg.prt_us);
    let update_period = Duration::from_micros(cfg.update_period_us);

    match cfg.kind.as_str() {
        "static" => {
            let radials = ChunkIter::build(shape, cfg.azimuth_chunk, None)?;
            Ok(Box::new(StaticJob::new(radials, dwell, prt, update_period)))
        }
        "surveillance" => {
            let elevations: Vec<usize> = (0..shape[0]).collect();
            Ok(Box::new(Surveillance::new(&elevations, shape[0], shape[1], cfg.azimuth_chunk, shape[2], dwell, prt)))
        }
        "vcp" => {
            let vcp_number = cfg.vcp.ok_or("jobs[].vcp is required when kind = \"vcp\"")?;
            Vcp::new(vcp_number, shape[0], shape[1], shape[2], update_period)
                .map(|j| Box::new(j) as Box<dyn ScanJob>)
                .ok_or_else(|| format!("unsupported VCP pattern number {vcp_number}").into())
        }
        other => Err(format!("unknown job kind '{other}'").into()),
    }
}

/// Synthetic volume source for demo runs: a single +45 dBZ storm cell that
/// drifts in azimuth one step per frame, against a uniform +5 dBZ
/// background. Not a real radar feed — there is no standard on-disk volume
/// format to target, so the driver demonstrates the adaptive loop against
/// data it generates itself.
struct DemoVolumeSource {
    shape: [usize; 3],
    frame: u64,
    frame_interval_us: u64,
    max_frames: u64,
}

impl DemoVolumeSource {
    fn new(shape: [usize; 3], frame_interval_us: u64, max_frames: u64) -> Self {
        DemoVolumeSource { shape, frame: 0, frame_interval_us, max_frames }
    }
}

impl Iterator for DemoVolumeSource {
    type Item = VolumeFrame;

    fn next(&mut self) -> Option<VolumeFrame> {
        if self.frame >= self.max_frames {
            return None;
        }
        let mut vals = Grid3::filled(self.shape, 5.0);
        let width = 5.min(self.shape[1]);
        let start = (self.frame as usize * 2) % self.shape[1];
        let gates = 50.min(self.shape[2]);
        for da in 0..width {
            let a = (start + da) % self.shape[1];
            for g in 0..gates {
                vals.set(0, a, g, 45.0);
            }
        }
        let scan_time = self.frame * self.frame_interval_us;
        self.frame += 1;
        Some(VolumeFrame { scan_time, vals })
    }
}
