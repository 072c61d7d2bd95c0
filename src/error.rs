//! Error types for identifier generation and configuration.

use std::path::PathBuf;

/// Failures surfaced by the generator.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The local clock moved backward and did not recover within the retry budget.
    #[error(
        "generate id failed, clock moved backwards: last accepted {last_accepted_ms}ms, observed {observed_ms}ms"
    )]
    ClockRegressed {
        /// Last timestamp accepted by the clock guard, in Unix milliseconds.
        last_accepted_ms: i64,
        /// Most recent rejected sample, in Unix milliseconds.
        observed_ms: i64,
    },
    /// A bucket has issued every sequence value its field can hold, or its
    /// window was already swept.
    ///
    /// Never returned by `Generator`; the assembler waits for the next window instead.
    #[error("sequence exhausted for window {window} (capacity {capacity})")]
    SequenceExhausted {
        /// Window label of the exhausted bucket.
        window: String,
        /// Largest sequence value the bucket can issue.
        capacity: u64,
    },
    /// Sustained overload kept every window full for longer than the configured cap.
    #[error("generate id failed, no window had capacity after {attempts} attempts")]
    OverflowRetriesExhausted {
        /// Number of reservation attempts made.
        attempts: u32,
    },
}

/// Failures loading or validating [`crate::config::Settings`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file is not valid YAML for [`crate::config::Settings`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// A value parsed but is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
