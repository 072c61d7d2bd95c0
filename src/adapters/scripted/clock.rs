//! Scripted clock that plays back a fixed list of instants.

use std::collections::VecDeque;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::ports::clock::Clock;

/// Serves queued instants in order, then keeps returning the last one.
///
/// Used to drive the generator through backward jumps and window changes
/// without depending on the wall clock.
pub struct ScriptedClock {
    state: Mutex<Script>,
}

struct Script {
    queued: VecDeque<DateTime<Utc>>,
    last: DateTime<Utc>,
}

impl ScriptedClock {
    /// Creates a clock that first returns `start` and then repeats it.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { state: Mutex::new(Script { queued: VecDeque::new(), last: start }) }
    }

    /// Creates a clock from Unix millisecond values.
    ///
    /// An empty list starts at the Unix epoch.
    #[must_use]
    pub fn from_millis(millis: &[i64]) -> Self {
        let clock = Self::starting_at(millis_to_utc(millis.first().copied().unwrap_or(0)));
        for ms in millis {
            clock.push(millis_to_utc(*ms));
        }
        clock
    }

    /// Queues another instant to be served after the ones already queued.
    pub fn push(&self, instant: DateTime<Utc>) {
        self.state.lock().queued.push_back(instant);
    }

    /// Drops anything queued and pins the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut state = self.state.lock();
        state.queued.clear();
        state.last = instant;
    }

    /// Number of instants still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.state.lock().queued.len()
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> DateTime<Utc> {
        let mut state = self.state.lock();
        if let Some(next) = state.queued.pop_front() {
            state.last = next;
        }
        state.last
    }
}

fn millis_to_utc(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}
