//! Scheduler configuration file support.
//!
//! This module provides the tunable scheduling constants (deceased offset,
//! Gregorian series length, personal monthly quota, liturgical feast list)
//! and utilities for reading them from TOML configuration files.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating scheduler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("no scheduler.toml found in standard locations")]
    NotFound,
}

/// A fixed liturgical blackout date, independent of the year.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeastDay {
    pub month: u32,
    pub day: u32,
}

impl FeastDay {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }
}

/// Major feasts on which no personal intention is placed.
pub const DEFAULT_FEAST_DAYS: [FeastDay; 9] = [
    FeastDay::new(1, 1),   // New Year
    FeastDay::new(1, 6),   // Epiphany
    FeastDay::new(3, 17),  // St. Patrick
    FeastDay::new(4, 22),  // Easter (approximate, varies yearly)
    FeastDay::new(5, 1),   // St. Joseph the Worker
    FeastDay::new(8, 15),  // Assumption
    FeastDay::new(11, 1),  // All Saints
    FeastDay::new(12, 8),  // Immaculate Conception
    FeastDay::new(12, 25), // Christmas
];

/// Scheduling constants consumed by the pass implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Days between a death date and the default celebration target.
    #[serde(default = "default_deceased_offset_days")]
    pub deceased_offset_days: i64,
    /// Units in a complete Gregorian series.
    #[serde(default = "default_gregorian_series_length")]
    pub gregorian_series_length: u32,
    /// Personal intentions placed per month at most.
    #[serde(default = "default_personal_monthly_quota")]
    pub personal_monthly_quota: u32,
    /// Month/day pairs excluded from personal-intention candidates.
    #[serde(default = "default_feast_days")]
    pub feast_days: Vec<FeastDay>,
}

fn default_deceased_offset_days() -> i64 {
    2
}

fn default_gregorian_series_length() -> u32 {
    30
}

fn default_personal_monthly_quota() -> u32 {
    3
}

fn default_feast_days() -> Vec<FeastDay> {
    DEFAULT_FEAST_DAYS.to_vec()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            deceased_offset_days: default_deceased_offset_days(),
            gregorian_series_length: default_gregorian_series_length(),
            personal_monthly_quota: default_personal_monthly_quota(),
            feast_days: default_feast_days(),
        }
    }
}

/// On-disk layout: the settings live under a `[scheduler]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    scheduler: Option<SchedulerConfig>,
}

impl SchedulerConfig {
    /// Load scheduler configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(SchedulerConfig)` if read, parsed and validated successfully
    /// * `Err(ConfigError)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let config = file.scheduler.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Load scheduler configuration from the default location.
    ///
    /// Searches for `scheduler.toml` in:
    /// 1. Current directory
    /// 2. `config/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = vec![
            PathBuf::from("scheduler.toml"),
            PathBuf::from("config/scheduler.toml"),
            PathBuf::from("../scheduler.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Check the settings are internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deceased_offset_days < 0 {
            return Err(ConfigError::Invalid(format!(
                "deceased_offset_days must be non-negative, got {}",
                self.deceased_offset_days
            )));
        }
        if self.gregorian_series_length == 0 {
            return Err(ConfigError::Invalid(
                "gregorian_series_length must be at least 1".to_string(),
            ));
        }
        if self.personal_monthly_quota == 0 {
            return Err(ConfigError::Invalid(
                "personal_monthly_quota must be at least 1".to_string(),
            ));
        }
        for feast in &self.feast_days {
            if !(1..=12).contains(&feast.month) || !(1..=31).contains(&feast.day) {
                return Err(ConfigError::Invalid(format!(
                    "feast day {}/{} is out of range",
                    feast.month, feast.day
                )));
            }
        }
        Ok(())
    }

    /// Whether a month/day pair is on the feast blackout list.
    pub fn is_feast_day(&self, month: u32, day: u32) -> bool {
        self.feast_days
            .iter()
            .any(|f| f.month == month && f.day == day)
    }
}
