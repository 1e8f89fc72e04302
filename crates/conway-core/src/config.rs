//! Configuration loading and typed config structures for the Conway engine.
//!
//! The canonical configuration lives in `conway-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure and provides a loader that reads the file.
//!
//! Configuration is immutable for the run. Validation happens once, at
//! controller construction, before any turn executes -- a bad worker
//! count or dimension is fatal, never handled dynamically.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// The offending field, dotted-path style.
        field: &'static str,
        /// Explanation of what is wrong with the value.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `conway-config.yaml`. All fields have
/// defaults, so a missing file or empty document yields a runnable
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Grid dimensions and initial-population settings.
    #[serde(default)]
    pub grid: GridConfig,

    /// Turn count and worker count.
    #[serde(default)]
    pub run: RunConfig,

    /// Statistics ticker settings.
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Grid dimensions and initial-population settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Grid width in cells.
    #[serde(default = "default_width")]
    pub width: usize,

    /// Grid height in cells.
    #[serde(default = "default_height")]
    pub height: usize,

    /// Seed for the random initial grid (used when no stored image
    /// matches the dimensions).
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Percentage of cells that start alive in a random initial grid,
    /// in `[0, 100]`.
    #[serde(default = "default_density_percent")]
    pub density_percent: u8,
}

/// Turn count and worker count.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Total number of turns to evolve.
    #[serde(default = "default_turns")]
    pub turns: u64,

    /// Number of concurrent partition workers per turn. Need not divide
    /// the grid height evenly; a remainder band gets its own worker.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Statistics ticker settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatsConfig {
    /// Interval between `AliveCellsCount` reports, in milliseconds.
    #[serde(default = "default_stats_interval_ms")]
    pub interval_ms: u64,
}

fn default_width() -> usize {
    128
}

fn default_height() -> usize {
    128
}

fn default_seed() -> u64 {
    42
}

fn default_density_percent() -> u8 {
    25
}

fn default_turns() -> u64 {
    100
}

fn default_workers() -> usize {
    4
}

fn default_stats_interval_ms() -> u64 {
    2000
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: default_seed(),
            density_percent: default_density_percent(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            turns: default_turns(),
            workers: default_workers(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_stats_interval_ms(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero dimension, a zero
    /// worker count, a zero ticker interval, or a density over 100%.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 {
            return Err(ConfigError::Invalid {
                field: "grid.width",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.grid.height == 0 {
            return Err(ConfigError::Invalid {
                field: "grid.height",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.grid.density_percent > 100 {
            return Err(ConfigError::Invalid {
                field: "grid.density_percent",
                reason: format!("must be in [0, 100], got {}", self.grid.density_percent),
            });
        }
        if self.run.workers == 0 {
            return Err(ConfigError::Invalid {
                field: "run.workers",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.stats.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "stats.interval_ms",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}
