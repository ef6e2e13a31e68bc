//! Simulation configuration loading.
//!
//! `SimConfig` is the single TOML file that drives a simulation run: grid
//! shape, scheduler slot count, logging verbosity, and the list of jobs to
//! seed the scheduler with. Mirrors the `ConfigLoader`/`ConfigError` split
//! the rest of the corpus uses for its own config files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or validating a [`SimConfig`].
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the given path.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parsing failed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed after a successful parse.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Logging verbosity, mapped onto `tracing`'s level filter at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level verbosity.
    Trace,
    /// Debug-level verbosity.
    Debug,
    /// Info-level verbosity (default).
    Info,
    /// Warning-level verbosity.
    Warn,
    /// Error-level verbosity.
    Error,
}

impl LogLevel {
    /// The `tracing::Level` this maps to.
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

/// Grid shape and region configuration (`[grid]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Number of elevation indices.
    pub elevations: usize,
    /// Number of azimuth indices.
    pub azimuths: usize,
    /// Number of range gates.
    pub range_gates: usize,
}

impl GridConfig {
    /// The grid shape as `[elevations, azimuths, range_gates]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.elevations, self.azimuths, self.range_gates]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.elevations == 0 || self.azimuths == 0 || self.range_gates == 0 {
            return Err(ConfigError::ValidationError(
                "grid.elevations, grid.azimuths, and grid.range_gates must all be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scheduler configuration (`[scheduler]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Fixed number of concurrently-active task slots.
    pub concurrent_max: usize,
    /// Denominator cap passed to [`crate::time::Ratio::approximate`] when
    /// computing `true_update_period`.
    #[serde(default = "default_ratio_denom")]
    pub ratio_denom: i64,
}

fn default_ratio_denom() -> i64 {
    100
}

impl SchedulerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrent_max == 0 {
            return Err(ConfigError::ValidationError("scheduler.concurrent_max must be > 0".to_string()));
        }
        if self.ratio_denom < 1 {
            return Err(ConfigError::ValidationError("scheduler.ratio_denom must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// One entry in `[[jobs]]`, describing a job to seed the scheduler with at
/// startup. `kind` selects which `ScanJob` implementation to build; the
/// remaining fields are interpreted according to `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Job kind: `"static"`, `"surveillance"`, or `"vcp"`.
    pub kind: String,
    /// Dwell time in microseconds (ignored for `"vcp"`, which derives
    /// dwell time per cut from the pattern tables).
    #[serde(default)]
    pub dwell_us: u64,
    /// Pulse repetition time in microseconds (ignored for `"vcp"`).
    #[serde(default)]
    pub prt_us: u64,
    /// Requested update period in microseconds; clamped up to the job's
    /// natural cycle time if smaller.
    #[serde(default)]
    pub update_period_us: u64,
    /// WSR-88D pattern number, required when `kind = "vcp"`.
    #[serde(default)]
    pub vcp: Option<u32>,
    /// Azimuth chunk width, used by `"surveillance"` (ignored otherwise).
    #[serde(default = "default_azimuth_chunk")]
    pub azimuth_chunk: usize,
}

fn default_azimuth_chunk() -> usize {
    5
}

impl JobConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.kind.as_str() {
            "static" | "surveillance" => Ok(()),
            "vcp" => {
                if self.vcp.is_none() {
                    return Err(ConfigError::ValidationError("jobs[].vcp is required when kind = \"vcp\"".to_string()));
                }
                Ok(())
            }
            other => Err(ConfigError::ValidationError(format!(
                "jobs[].kind='{other}' must be one of \"static\", \"surveillance\", \"vcp\""
            ))),
        }
    }
}

/// Top-level simulation configuration, loaded from a single TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Logging verbosity.
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
    /// Grid shape.
    pub grid: GridConfig,
    /// Scheduler slot pool sizing.
    pub scheduler: SchedulerConfig,
    /// Jobs to register at startup.
    #[serde(default, rename = "jobs")]
    pub jobs: Vec<JobConfig>,
    /// Adaptive-sensing controller to drive the run, by registry name
    /// (`"null"`, `"simple"`, `"simple_vol"`, `"simple_ppi"`,
    /// `"simple_tracking"`, `"scit"`). Defaults to `"null"` (no adaptation).
    #[serde(default = "default_controller")]
    pub controller: String,
}

fn default_controller() -> String {
    "null".to_string()
}

impl SimConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.display().to_string())
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        let config: SimConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.scheduler.validate()?;
        for job in &self.jobs {
            job.validate()?;
        }
        Ok(())
    }
}
