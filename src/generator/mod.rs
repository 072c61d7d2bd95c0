//! Sortable identifier generation.
//!
//! An identifier is `<window><machine_id><sequence><mark>`:
//!
//! - `window` is the accepted timestamp truncated to the resolution
//!   (epoch milliseconds, or UTC `YYYYMMDDhhmmss` for short ids);
//! - `sequence` is zero-padded to 12 digits (3 for short ids) and starts at 1
//!   in every (window, machine id) bucket;
//! - `mark` is a reserved digit, always `0`.
//!
//! Time passes through a [`ClockGuard`] so windows never move backward. When
//! a bucket is full the generator sleeps briefly and tries again in a later
//! window.

pub mod buckets;
pub mod clock_guard;
pub mod resolution;
pub mod sweeper;

use std::sync::Arc;
use std::thread;

use buckets::{BucketKey, BucketTable};
use clock_guard::ClockGuard;
use resolution::{format_id, Resolution};
use sweeper::Sweeper;

use crate::adapters::live::LiveClock;
use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::ports::{Clock, IdGenerator};

pub use resolution::{IdParts, RESERVED_MARK};

/// Mints identifiers for any number of machine ids.
///
/// Safe to share across threads. Each generator owns its clock guard,
/// bucket table and sweeper; callers that need process-wide uniqueness per
/// machine id should share one generator (see [`crate::default_generator`]).
pub struct Generator {
    clock: Arc<dyn Clock>,
    guard: Arc<ClockGuard>,
    table: Arc<BucketTable>,
    sweeper: Sweeper,
    config: GeneratorConfig,
}

impl Generator {
    /// Creates a generator backed by the system clock.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_clock(Arc::new(LiveClock), config)
    }

    /// Creates a generator that samples time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>, config: GeneratorConfig) -> Self {
        Self {
            clock,
            guard: Arc::new(ClockGuard::new(config.clock.regression_retries)),
            table: Arc::new(BucketTable::new()),
            sweeper: Sweeper::new(),
            config,
        }
    }

    /// Mints a millisecond-resolution identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::ClockRegressed`] if the clock moved backward and
    /// did not recover, or [`GenerateError::OverflowRetriesExhausted`] if every
    /// window stayed full for the whole retry budget.
    pub fn create_id(&self, machine_id: &str) -> Result<String, GenerateError> {
        self.generate(machine_id, Resolution::Millis)
    }

    /// Mints a second-resolution identifier.
    ///
    /// # Errors
    ///
    /// Same as [`Generator::create_id`].
    pub fn create_short_id(&self, machine_id: &str) -> Result<String, GenerateError> {
        self.generate(machine_id, Resolution::Seconds)
    }

    /// Mints an identifier at `resolution`.
    ///
    /// # Errors
    ///
    /// Same as [`Generator::create_id`].
    pub fn generate(&self, machine_id: &str, resolution: Resolution) -> Result<String, GenerateError> {
        self.sweeper.ensure_started(&self.table, &self.guard, &self.config.sweeper);

        let max_retries = self.config.overflow.max_retries;
        let mut attempts = 0;
        loop {
            attempts += 1;
            let now = self.guard.advance(self.clock.as_ref(), self.clock.now())?;
            let window = resolution.window(now);
            let key = BucketKey::new(&window, machine_id);
            match self.table.reserve(&key, &window) {
                Ok(sequence) => return Ok(format_id(&window, machine_id, sequence)),
                Err(GenerateError::SequenceExhausted { window, capacity }) => {
                    if attempts > max_retries {
                        tracing::warn!(attempts, %window, "no window had capacity, giving up");
                        return Err(GenerateError::OverflowRetriesExhausted { attempts });
                    }
                    tracing::trace!(%window, capacity, attempts, "window full, backing off");
                    thread::sleep(self.config.overflow.backoff());
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Number of buckets currently tracked.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.table.len()
    }

    /// Whether the background sweeper has been started.
    #[must_use]
    pub fn sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }

    /// Settings this generator was built with.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl IdGenerator for Generator {
    fn create_id(&self, machine_id: &str) -> Result<String, GenerateError> {
        Generator::create_id(self, machine_id)
    }

    fn create_short_id(&self, machine_id: &str) -> Result<String, GenerateError> {
        Generator::create_short_id(self, machine_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::adapters::scripted::ScriptedClock;
    use crate::config::{OverflowConfig, SweeperConfig};

    fn scripted(millis: &[i64]) -> (Arc<ScriptedClock>, Generator) {
        let clock = Arc::new(ScriptedClock::from_millis(millis));
        let generator = Generator::with_clock(clock.clone(), GeneratorConfig::default());
        (clock, generator)
    }

    #[test]
    fn id_layout_millis() {
        let (_, generator) = scripted(&[1_700_000_000_123]);
        let id = generator.create_id("0118").unwrap();
        assert_eq!(id, "170000000012301180000000000010");
    }

    #[test]
    fn id_layout_seconds() {
        let (_, generator) = scripted(&[1_700_000_000_123]);
        let id = generator.create_short_id("0118").unwrap();
        assert_eq!(id, "2023111422132001180010");
    }

    #[test]
    fn sequence_increments_within_window() {
        let (_, generator) = scripted(&[1_700_000_000_123]);
        let a = generator.create_id("m").unwrap();
        let b = generator.create_id("m").unwrap();
        let pa = IdParts::parse(&a, "m", Resolution::Millis).unwrap();
        let pb = IdParts::parse(&b, "m", Resolution::Millis).unwrap();
        assert_eq!(pa.window, pb.window);
        assert_eq!((pa.sequence, pb.sequence), (1, 2));
    }

    #[test]
    fn sequence_resets_in_new_window() {
        let (clock, generator) = scripted(&[1_000]);
        generator.create_id("m").unwrap();
        generator.create_id("m").unwrap();
        clock.set(Utc.timestamp_millis_opt(1_001).unwrap());
        let id = generator.create_id("m").unwrap();
        let parts = IdParts::parse(&id, "m", Resolution::Millis).unwrap();
        assert_eq!(parts.window, "1001");
        assert_eq!(parts.sequence, 1);
    }

    #[test]
    fn machine_ids_have_separate_sequences() {
        let (_, generator) = scripted(&[1_000]);
        assert_eq!(generator.create_short_id("a").unwrap(), "19700101000001a0010");
        assert_eq!(generator.create_short_id("b").unwrap(), "19700101000001b0010");
        assert_eq!(generator.bucket_count(), 2);
    }

    #[test]
    fn empty_machine_id_is_accepted() {
        let (_, generator) = scripted(&[1_000]);
        assert_eq!(generator.create_id("").unwrap(), "10000000000000010");
    }

    #[test]
    fn overflow_moves_to_next_window() {
        let clock = Arc::new(ScriptedClock::from_millis(&[1_000]));
        let generator = Generator::with_clock(clock.clone(), GeneratorConfig::default());
        for _ in 0..999 {
            generator.create_short_id("m").unwrap();
        }
        // The bucket for 00:00:01 is full; the next second becomes available
        // while the generator backs off.
        clock.push(Utc.timestamp_millis_opt(1_500).unwrap());
        clock.push(Utc.timestamp_millis_opt(2_000).unwrap());
        let id = generator.create_short_id("m").unwrap();
        let parts = IdParts::parse(&id, "m", Resolution::Seconds).unwrap();
        assert_eq!(parts.window, "19700101000002");
        assert_eq!(parts.sequence, 1);
    }

    #[test]
    fn overflow_cap_surfaces_error() {
        let clock = Arc::new(ScriptedClock::from_millis(&[1_000]));
        let config = GeneratorConfig {
            overflow: OverflowConfig { backoff_ms: 0, max_retries: 5 },
            ..GeneratorConfig::default()
        };
        let generator = Generator::with_clock(clock, config);
        for _ in 0..999 {
            generator.create_short_id("m").unwrap();
        }
        let err = generator.create_short_id("m").unwrap_err();
        assert_eq!(err, GenerateError::OverflowRetriesExhausted { attempts: 6 });
    }

    #[test]
    fn clock_regression_surfaces_error() {
        let (clock, generator) = scripted(&[5_000]);
        generator.create_id("m").unwrap();
        clock.set(Utc.timestamp_millis_opt(4_000).unwrap());
        let err = generator.create_id("m").unwrap_err();
        assert_eq!(
            err,
            GenerateError::ClockRegressed { last_accepted_ms: 5_000, observed_ms: 4_000 }
        );
    }

    #[test]
    fn windows_never_decrease() {
        let (clock, generator) = scripted(&[1_000, 1_002, 1_001, 1_005]);
        let mut windows = Vec::new();
        for _ in 0..3 {
            let id = generator.create_id("m").unwrap();
            windows.push(IdParts::parse(&id, "m", Resolution::Millis).unwrap().window);
        }
        assert_eq!(clock.remaining(), 0);
        assert_eq!(windows, vec!["1000", "1002", "1005"]);
    }

    #[test]
    fn starts_sweeper_on_first_use() {
        let (_, generator) = scripted(&[1_000]);
        assert!(!generator.sweeper_running());
        generator.create_id("m").unwrap();
        assert!(generator.sweeper_running());
    }

    fn sweeping(clock: &Arc<ScriptedClock>) -> Generator {
        let config = GeneratorConfig {
            overflow: OverflowConfig { backoff_ms: 0, max_retries: 50 },
            sweeper: SweeperConfig { interval_secs: 1, stale_after_secs: 1 },
            ..GeneratorConfig::default()
        };
        Generator::with_clock(clock.clone(), config)
    }

    #[test]
    fn sweeps_leave_clock_samples_to_callers() {
        let clock = Arc::new(ScriptedClock::from_millis(&[1_000]));
        let generator = sweeping(&clock);
        generator.create_id("m").unwrap();

        clock.push(Utc.timestamp_millis_opt(2_500).unwrap());
        thread::sleep(std::time::Duration::from_millis(1_500));
        assert_eq!(clock.remaining(), 1);

        let id = generator.create_id("m").unwrap();
        assert_eq!(id, "2500m0000000000010");
    }

    #[test]
    fn minting_continues_across_sweeps_after_forward_jump() {
        let clock = Arc::new(ScriptedClock::from_millis(&[1_000]));
        let generator = sweeping(&clock);
        let mut issued = HashSet::new();
        assert!(issued.insert(generator.create_id("m").unwrap()));

        clock.set(Utc.timestamp_millis_opt(3_600_000).unwrap());
        assert!(issued.insert(generator.create_id("m").unwrap()));
        assert_eq!(generator.bucket_count(), 2);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while generator.bucket_count() > 1 && std::time::Instant::now() < deadline {
            thread::sleep(std::time::Duration::from_millis(50));
        }
        assert_eq!(generator.bucket_count(), 1);

        // The current window survived the sweep and keeps counting.
        let id = generator.create_id("m").unwrap();
        assert_eq!(IdParts::parse(&id, "m", Resolution::Millis).unwrap().sequence, 2);
        assert!(issued.insert(id));

        clock.set(Utc.timestamp_millis_opt(3_600_001).unwrap());
        let id = generator.create_id("m").unwrap();
        assert_eq!(IdParts::parse(&id, "m", Resolution::Millis).unwrap().sequence, 1);
        assert!(issued.insert(id));
    }

    #[test]
    fn live_generator_ids_are_unique() {
        let generator = Generator::default();
        let ids: HashSet<_> = (0..5_000).map(|_| generator.create_id("0118").unwrap()).collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn usable_through_port() {
        let (_, generator) = scripted(&[1_000]);
        let port: &dyn IdGenerator = &generator;
        assert_eq!(port.create_short_id("m").unwrap(), "19700101000001m0010");
    }
}
