//! Lexically sortable, collision-free identifiers keyed by a caller-supplied
//! machine id.
//!
//! ```no_run
//! let id = sortid::create_id("0118").expect("clock moved backwards");
//! let short = sortid::create_short_id("0118").expect("clock moved backwards");
//! assert!(id.len() > short.len());
//! ```

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod logging;
pub mod ports;
pub mod trace;

use clap::Parser;
use once_cell::sync::Lazy;

pub use error::GenerateError;
pub use generator::{Generator, IdParts};

/// Process-wide generator with stock settings, created on first use.
static DEFAULT_GENERATOR: Lazy<Generator> = Lazy::new(Generator::default);

/// Returns the process-wide generator.
#[must_use]
pub fn default_generator() -> &'static Generator {
    &DEFAULT_GENERATOR
}

/// Mints a millisecond-resolution identifier from the process-wide generator.
///
/// # Errors
///
/// Returns [`GenerateError::ClockRegressed`] if the system clock moved
/// backward and did not recover, or [`GenerateError::OverflowRetriesExhausted`]
/// if every window stayed full for the whole retry budget.
pub fn create_id(machine_id: &str) -> Result<String, GenerateError> {
    DEFAULT_GENERATOR.create_id(machine_id)
}

/// Mints a second-resolution identifier from the process-wide generator.
///
/// # Errors
///
/// Same as [`create_id`].
pub fn create_short_id(machine_id: &str) -> Result<String, GenerateError> {
    DEFAULT_GENERATOR.create_short_id(machine_id)
}

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli)
}
