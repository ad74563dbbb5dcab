//! # Configuration
//!
//! Layered run configuration: built-in defaults, an optional TOML file, then
//! `PI_*` environment variables. Command-line values are applied last by the
//! binary through [`PiConfig::with_overrides`].

use crate::constants::{env::CONFIG_PREFIX, DEFAULT_NUM_STEPS};
use crate::error::{PiError, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

/// Console log rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PiConfig {
    /// Total integration steps. Kept signed until validated so that negative
    /// input is reported instead of wrapped.
    pub num_steps: i64,
    /// Worker count for the thread transport
    pub workers: usize,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            num_steps: DEFAULT_NUM_STEPS,
            workers: default_workers(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl PiConfig {
    /// Defaults, then `path` if given, then `PI_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, CONFIG_PREFIX)
    }

    /// Same as [`PiConfig::load`] with a custom environment prefix
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("num_steps", defaults.num_steps)?
            .set_default("workers", defaults.workers as i64)?
            .set_default("log_level", defaults.log_level.as_str())?
            .set_default("log_format", defaults.log_format.as_str())?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(PiError::configuration(
                    "config",
                    format!("configuration file not found: {}", path.display()),
                ));
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(env_prefix).try_parsing(true));

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Apply command-line values on top of the loaded layers
    pub fn with_overrides(mut self, num_steps: Option<i64>, workers: Option<usize>) -> Self {
        if let Some(num_steps) = num_steps {
            self.num_steps = num_steps;
        }
        if let Some(workers) = workers {
            self.workers = workers;
        }
        self
    }

    /// Reject configurations no run can start from
    pub fn validate(&self) -> Result<()> {
        validate_num_steps(self.num_steps)?;
        if self.workers == 0 {
            return Err(PiError::configuration(
                "workers",
                "at least one worker is required",
            ));
        }
        Ok(())
    }
}

/// Step counts must be strictly positive
pub fn validate_num_steps(num_steps: i64) -> Result<u64> {
    u64::try_from(num_steps)
        .ok()
        .filter(|&steps| steps > 0)
        .ok_or_else(|| {
            PiError::configuration(
                "num_steps",
                format!("number of steps must be positive, got {num_steps}"),
            )
        })
}

/// One worker per available CPU
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
