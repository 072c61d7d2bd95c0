//! Configuration for the generator and the `sortid` binary.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the stock behavior: 100 clock resamples, a 1 ms overflow backoff
//! and a sweeper that evicts buckets older than 10 s every 10 s.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Machine id used when the command line does not give one.
    pub machine_id: Option<String>,
    /// Logging output.
    pub log: LogConfig,
    /// Generator tuning.
    pub generator: GeneratorConfig,
}

impl Settings {
    /// Loads and validates settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or holds
    /// out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: PathBuf::from(path), source })?;
        let settings: Self = serde_yaml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: PathBuf::from(path), source })?;
        settings.generator.validate()?;
        Ok(settings)
    }

    /// Loads from `path` when given, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line events.
    #[default]
    Compact,
    /// Multi-line, human-oriented events.
    Pretty,
}

/// Logging settings. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `"warn"` or `"sortid=debug"`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "warn".into(), format: LogFormat::Compact }
    }
}

/// Generator tuning knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Clock guard settings.
    pub clock: ClockConfig,
    /// Sequence overflow settings.
    pub overflow: OverflowConfig,
    /// Expiry sweeper settings.
    pub sweeper: SweeperConfig,
}

impl GeneratorConfig {
    /// Rejects values that would make the sweeper spin.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a sweeper interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweeper.interval_secs == 0 {
            return Err(ConfigError::Invalid("sweeper.interval_secs must be > 0".into()));
        }
        if self.sweeper.stale_after_secs == 0 {
            return Err(ConfigError::Invalid("sweeper.stale_after_secs must be > 0".into()));
        }
        Ok(())
    }
}

/// Clock guard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConfig {
    /// Resamples allowed after a backward jump before failing.
    pub regression_retries: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { regression_retries: 100 }
    }
}

/// Sequence overflow settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverflowConfig {
    /// Sleep between attempts once a window is full, in milliseconds.
    pub backoff_ms: u64,
    /// Reservation attempts allowed before giving up.
    pub max_retries: u32,
}

impl OverflowConfig {
    /// Backoff as a [`Duration`].
    #[must_use]
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for OverflowConfig {
    fn default() -> Self {
        Self { backoff_ms: 1, max_retries: 1_000_000 }
    }
}

/// Expiry sweeper settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweeperConfig {
    /// Pause between sweeps, in seconds.
    pub interval_secs: u64,
    /// Buckets whose window started longer ago than this are evicted.
    pub stale_after_secs: u64,
}

impl SweeperConfig {
    /// Interval as a [`Duration`].
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Staleness threshold as a [`chrono::Duration`].
    #[must_use]
    pub fn stale_after(&self) -> chrono::Duration {
        let secs = i64::try_from(self.stale_after_secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        chrono::Duration::seconds(secs)
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self { interval_secs: 10, stale_after_secs: 10 }
    }
}
