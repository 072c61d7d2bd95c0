//! Service context wiring settings and ports for command handlers.

use std::sync::Arc;

use crate::adapters::live::LiveClock;
use crate::config::Settings;
use crate::generator::Generator;
use crate::ports::clock::Clock;
use crate::ports::id_gen::IdGenerator;
use crate::trace::DEFAULT_TRACE_MACHINE_ID;

/// Bundles what the command handlers need.
pub struct ServiceContext {
    /// Clock the generator samples.
    pub clock: Arc<dyn Clock>,
    /// Identifier source.
    pub ids: Arc<dyn IdGenerator>,
    /// Loaded settings.
    pub settings: Settings,
}

impl ServiceContext {
    /// Creates a context backed by the system clock.
    #[must_use]
    pub fn live(settings: Settings) -> Self {
        Self::with_clock(Arc::new(LiveClock), settings)
    }

    /// Creates a context whose generator samples `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>, settings: Settings) -> Self {
        let generator = Generator::with_clock(Arc::clone(&clock), settings.generator.clone());
        Self { clock, ids: Arc::new(generator), settings }
    }

    /// Picks the machine id: explicit value, then settings, then `"0"`.
    #[must_use]
    pub fn machine_id(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.settings.machine_id.as_deref())
            .unwrap_or(DEFAULT_TRACE_MACHINE_ID)
            .to_string()
    }
}
