//! Rejects time regressions so windows never move backward.

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::error::GenerateError;
use crate::ports::Clock;

/// Tracks the last accepted timestamp for a generator.
///
/// Accepted time is non-decreasing across all callers. The lock is held for
/// the whole check, including resamples.
#[derive(Debug)]
pub struct ClockGuard {
    last_accepted_ms: Mutex<i64>,
    regression_retries: u32,
}

impl ClockGuard {
    /// Creates a guard that tolerates `regression_retries` resamples after a
    /// backward jump.
    #[must_use]
    pub fn new(regression_retries: u32) -> Self {
        Self { last_accepted_ms: Mutex::new(i64::MIN), regression_retries }
    }

    /// Accepts `observed` if it is not earlier than the last accepted time,
    /// resampling `clock` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::ClockRegressed`] when every resample is still
    /// behind the last accepted time.
    pub fn advance(
        &self,
        clock: &dyn Clock,
        observed: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, GenerateError> {
        let mut last = self.last_accepted_ms.lock();
        let mut now = observed;
        let mut resamples = 0;
        loop {
            let now_ms = now.timestamp_millis();
            if now_ms >= *last {
                *last = now_ms;
                return Ok(now);
            }
            if resamples >= self.regression_retries {
                tracing::warn!(
                    last_accepted_ms = *last,
                    observed_ms = now_ms,
                    resamples,
                    "clock regression did not recover"
                );
                return Err(GenerateError::ClockRegressed {
                    last_accepted_ms: *last,
                    observed_ms: now_ms,
                });
            }
            tracing::debug!(last_accepted_ms = *last, observed_ms = now_ms, "clock moved backwards");
            resamples += 1;
            now = clock.now();
        }
    }

    /// Last accepted timestamp in Unix milliseconds, if any.
    #[must_use]
    pub fn last_accepted_ms(&self) -> Option<i64> {
        let last = *self.last_accepted_ms.lock();
        (last != i64::MIN).then_some(last)
    }

    /// Last accepted timestamp, if any.
    ///
    /// Every later accepted time is at least this, so anything computed from
    /// it never runs ahead of what callers can still observe.
    #[must_use]
    pub fn last_accepted(&self) -> Option<DateTime<Utc>> {
        self.last_accepted_ms().and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}
