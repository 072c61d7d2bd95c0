//! Background eviction of stale buckets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use super::buckets::BucketTable;
use super::clock_guard::ClockGuard;
use crate::config::SweeperConfig;

/// Starts the sweeper thread at most once.
#[derive(Debug, Default)]
pub struct Sweeper {
    started: AtomicBool,
}

impl Sweeper {
    /// Creates a sweeper that has not started yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the background thread has been launched.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Launches the sweeper thread unless it is already running.
    ///
    /// Returns `true` only for the call that launched it. The thread keeps a
    /// weak reference to `table` and exits once the table is dropped.
    ///
    /// Staleness is measured from the last time `guard` accepted, not from a
    /// fresh clock sample. The thread idles until the guard has accepted once.
    pub fn ensure_started(
        &self,
        table: &Arc<BucketTable>,
        guard: &Arc<ClockGuard>,
        config: &SweeperConfig,
    ) -> bool {
        if self.started.load(Ordering::Acquire) {
            return false;
        }
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let table = Arc::downgrade(table);
        let guard = Arc::clone(guard);
        let interval = config.interval();
        let stale_after = config.stale_after();
        let spawned = thread::Builder::new()
            .name("sortid-sweeper".into())
            .spawn(move || run(&table, &guard, interval, stale_after));

        match spawned {
            Ok(_) => {
                tracing::debug!(interval_secs = interval.as_secs(), "bucket sweeper started");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to start bucket sweeper, will retry");
                self.started.store(false, Ordering::Release);
                false
            }
        }
    }
}

fn run(
    table: &Weak<BucketTable>,
    guard: &ClockGuard,
    interval: Duration,
    stale_after: chrono::Duration,
) {
    loop {
        thread::sleep(interval);
        let Some(table) = table.upgrade() else {
            tracing::debug!("bucket table dropped, sweeper exiting");
            return;
        };
        let Some(now) = guard.last_accepted() else {
            continue;
        };
        let report = table.sweep(now, stale_after);
        tracing::debug!(
            examined = report.examined,
            evicted = report.evicted,
            busy = report.busy,
            unparsable = report.unparsable,
            remaining = table.len(),
            "swept buckets"
        );
    }
}
