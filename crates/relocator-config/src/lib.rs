//! Configuration system for the relocation engine.
//!
//! Load relocation options from TOML or YAML files, or receive them with a
//! request, to control the search window, the execution budget and the
//! solutions to skip.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use relocator_config::RelocationConfig;
//! use std::time::Duration;
//!
//! let config = RelocationConfig::from_toml_str(r#"
//!     days_bound = 14
//!     max_exec_time = 60
//!     skip_booking_ids = [12, 15]
//! "#).unwrap();
//!
//! assert_eq!(config.days_bound, 14);
//! assert_eq!(config.execution_budget(), Duration::from_secs(40));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use relocator_config::RelocationConfig;
//!
//! let config = RelocationConfig::load("relocation.toml").unwrap_or_default();
//! assert_eq!(config.days_bound, 7);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default look-back/look-forward around the relocating stay, in days.
pub const DEFAULT_DAYS_BOUND: u32 = 7;

/// Default host execution time, in seconds.
pub const DEFAULT_MAX_EXEC_TIME: u64 = 180;

/// Seconds kept in reserve below the host execution time.
pub const DEFAULT_EXEC_TIME_MARGIN: u64 = 20;

/// Smallest budget ever granted to a search, in seconds.
pub const DEFAULT_MIN_EXEC_TIME: u64 = 10;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Options of one relocation search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RelocationConfig {
    /// Days scanned before the check-in and after the check-out.
    pub days_bound: u32,

    /// Host execution time in seconds the search must stay under.
    pub max_exec_time: u64,

    /// Seconds subtracted from `max_exec_time` to leave room for the caller.
    pub exec_time_margin: u64,

    /// Lower bound for the derived budget, in seconds.
    pub min_exec_time: u64,

    /// Keep searching after the first fit to count every fitting solution.
    pub count_all: bool,

    /// Moveset signatures that must not be returned again.
    pub skip_moveset_signatures: Vec<String>,

    /// Bookings whose room lines must not be moved.
    pub skip_booking_ids: Vec<u64>,
}

impl Default for RelocationConfig {
    fn default() -> Self {
        Self {
            days_bound: DEFAULT_DAYS_BOUND,
            max_exec_time: DEFAULT_MAX_EXEC_TIME,
            exec_time_margin: DEFAULT_EXEC_TIME_MARGIN,
            min_exec_time: DEFAULT_MIN_EXEC_TIME,
            count_all: false,
            skip_moveset_signatures: Vec::new(),
            skip_booking_ids: Vec::new(),
        }
    }
}

impl RelocationConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days_bound > 365 {
            return Err(ConfigError::Invalid(format!(
                "days_bound must not exceed 365, got {}",
                self.days_bound
            )));
        }
        if self.min_exec_time == 0 {
            return Err(ConfigError::Invalid(
                "min_exec_time must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_days_bound(mut self, days: u32) -> Self {
        self.days_bound = days;
        self
    }

    pub fn with_max_exec_time(mut self, seconds: u64) -> Self {
        self.max_exec_time = seconds;
        self
    }

    pub fn with_count_all(mut self, count_all: bool) -> Self {
        self.count_all = count_all;
        self
    }

    pub fn with_skipped_signature(mut self, signature: impl Into<String>) -> Self {
        self.skip_moveset_signatures.push(signature.into());
        self
    }

    pub fn with_skipped_booking(mut self, booking_id: u64) -> Self {
        self.skip_booking_ids.push(booking_id);
        self
    }

    /// Wall-clock budget granted to the search.
    ///
    /// `max_exec_time - exec_time_margin`, never below `min_exec_time`.
    ///
    /// # Examples
    ///
    /// ```
    /// use relocator_config::RelocationConfig;
    /// use std::time::Duration;
    ///
    /// assert_eq!(RelocationConfig::default().execution_budget(), Duration::from_secs(160));
    /// assert_eq!(
    ///     RelocationConfig::default().with_max_exec_time(25).execution_budget(),
    ///     Duration::from_secs(10),
    /// );
    /// ```
    pub fn execution_budget(&self) -> Duration {
        let seconds = self
            .max_exec_time
            .saturating_sub(self.exec_time_margin)
            .max(self.min_exec_time);
        Duration::from_secs(seconds)
    }

    /// Number of seconds in `days_bound`.
    pub fn bound_seconds(&self) -> i64 {
        i64::from(self.days_bound) * 86_400
    }

    pub fn skips_booking(&self, booking_id: u64) -> bool {
        self.skip_booking_ids.contains(&booking_id)
    }

    pub fn skips_signature(&self, signature: &str) -> bool {
        self.skip_moveset_signatures.iter().any(|s| s == signature)
    }
}
