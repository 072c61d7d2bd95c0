//! Per-(window, machine id) sequence counters.
//!
//! The table lock covers only lookup and insertion. Each bucket carries its
//! own lock, held across the increment, so callers on different keys never
//! wait for each other.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::resolution::{Resolution, Window};
use crate::error::GenerateError;

/// Window label followed by the machine id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey(String);

impl BucketKey {
    /// Builds the key for `machine_id` in `window`.
    #[must_use]
    pub fn new(window: &Window, machine_id: &str) -> Self {
        Self(format!("{}{machine_id}", window.label))
    }

    /// Key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
struct BucketState {
    sequence: u64,
    window: String,
    resolution: Resolution,
    retired: bool,
}

#[derive(Debug)]
struct Bucket {
    state: Mutex<BucketState>,
}

impl Bucket {
    fn new(window: &Window) -> Self {
        Self {
            state: Mutex::new(BucketState {
                sequence: 0,
                window: window.label.clone(),
                resolution: window.resolution,
                retired: false,
            }),
        }
    }
}

/// Outcome of one sweep over the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Buckets looked at.
    pub examined: usize,
    /// Buckets removed.
    pub evicted: usize,
    /// Buckets skipped because an allocation held their lock.
    pub busy: usize,
    /// Buckets skipped because their window label did not parse.
    pub unparsable: usize,
}

#[derive(Debug, Default)]
struct Buckets {
    by_key: HashMap<BucketKey, Arc<Bucket>>,
    // Windows starting before this may have been evicted and are closed.
    horizon: Option<DateTime<Utc>>,
}

/// Maps bucket keys to sequence counters.
#[derive(Debug, Default)]
pub struct BucketTable {
    buckets: Mutex<Buckets>,
}

impl BucketTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next sequence value for `key`, creating its bucket on
    /// first use. Values start at 1 and are strictly increasing per key.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::SequenceExhausted`] once the window's
    /// capacity has been issued, or when the window has already been swept.
    pub fn reserve(&self, key: &BucketKey, window: &Window) -> Result<u64, GenerateError> {
        let capacity = window.resolution.capacity();
        let closed = || GenerateError::SequenceExhausted { window: window.label.clone(), capacity };

        let bucket = {
            let mut guard = self.buckets.lock();
            let Buckets { by_key, horizon } = &mut *guard;
            match by_key.entry(key.clone()) {
                Entry::Occupied(entry) => Arc::clone(entry.get()),
                Entry::Vacant(entry) => {
                    if behind_horizon(window, *horizon) {
                        return Err(closed());
                    }
                    Arc::clone(entry.insert(Arc::new(Bucket::new(window))))
                }
            }
        };

        let mut state = bucket.state.lock();
        // A retired bucket was evicted between lookup and lock.
        if state.retired || state.sequence >= capacity {
            return Err(closed());
        }
        state.sequence += 1;
        Ok(state.sequence)
    }

    /// Evicts buckets whose window started before `now - stale_after`.
    ///
    /// Buckets whose lock is held are skipped this round rather than waited on.
    pub fn sweep(&self, now: DateTime<Utc>, stale_after: chrono::Duration) -> SweepReport {
        let mut report = SweepReport::default();
        let Some(cutoff) = now.checked_sub_signed(stale_after) else {
            return report;
        };
        let mut guard = self.buckets.lock();
        guard.by_key.retain(|key, bucket| {
            report.examined += 1;
            let Some(mut state) = bucket.state.try_lock() else {
                report.busy += 1;
                return true;
            };
            let Some(start) = state.resolution.window_start(&state.window) else {
                tracing::debug!(key = key.as_str(), window = %state.window, "skipping unparsable window");
                report.unparsable += 1;
                return true;
            };
            if start < cutoff {
                state.retired = true;
                report.evicted += 1;
                false
            } else {
                true
            }
        });
        if report.evicted > 0 {
            guard.horizon = Some(guard.horizon.map_or(cutoff, |h| h.max(cutoff)));
        }
        report
    }

    /// Number of live buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.lock().by_key.len()
    }

    /// Whether the table holds no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.lock().by_key.is_empty()
    }

    #[cfg(test)]
    fn insert_raw(&self, key: &str, window: &str, resolution: Resolution) -> Arc<Bucket> {
        let window = Window { label: window.into(), resolution };
        let bucket = Arc::new(Bucket::new(&window));
        self.buckets.lock().by_key.insert(BucketKey(key.into()), Arc::clone(&bucket));
        bucket
    }
}

fn behind_horizon(window: &Window, horizon: Option<DateTime<Utc>>) -> bool {
    match (horizon, window.resolution.window_start(&window.label)) {
        (Some(horizon), Some(start)) => start < horizon,
        _ => false,
    }
}
