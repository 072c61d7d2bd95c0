//! Command dispatch and handlers.

pub mod inspect;
pub mod mint;
pub mod trace;

use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::generator::resolution::Resolution;
use crate::logging;

/// Dispatch a parsed command to its handler.
///
/// Settings come from `--config` / `SORTID_CONFIG` when given, defaults
/// otherwise. Logging is initialized before the handler runs.
///
/// # Errors
///
/// Returns an error string if settings cannot be loaded or the handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let settings = Settings::load_or_default(cli.config.as_deref()).map_err(|e| e.to_string())?;
    logging::init(&settings.log);
    let ctx = ServiceContext::live(settings);
    dispatch_with_context(&cli.command, &ctx)
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Id(args) => mint::run(ctx, args, Resolution::Millis),
        Command::Short(args) => mint::run(ctx, args, Resolution::Seconds),
        Command::Trace { header, machine } => {
            trace::run(ctx, header.as_deref(), machine.as_deref())
        }
        Command::Inspect { id, machine, short } => {
            let resolution = if *short { Resolution::Seconds } else { Resolution::Millis };
            inspect::run(id, machine, resolution)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::adapters::scripted::ScriptedClock;
    use crate::cli::MintArgs;

    fn scripted_context() -> ServiceContext {
        ServiceContext::with_clock(
            Arc::new(ScriptedClock::from_millis(&[1_000])),
            Settings::default(),
        )
    }

    #[test]
    fn dispatches_every_command() {
        let ctx = scripted_context();
        let mint = MintArgs { machine: Some("m".into()), count: 2, json: false };
        assert!(dispatch_with_context(&Command::Id(mint), &ctx).is_ok());

        let mint = MintArgs { machine: None, count: 1, json: true };
        assert!(dispatch_with_context(&Command::Short(mint), &ctx).is_ok());

        let trace = Command::Trace { header: Some("abc".into()), machine: None };
        assert!(dispatch_with_context(&trace, &ctx).is_ok());

        let inspect = Command::Inspect {
            id: "19700101000001m0010".into(),
            machine: "m".into(),
            short: true,
        };
        assert!(dispatch_with_context(&inspect, &ctx).is_ok());
    }

    #[test]
    fn surfaces_clock_regression() {
        let clock = Arc::new(ScriptedClock::from_millis(&[5_000]));
        let ctx = ServiceContext::with_clock(clock.clone(), Settings::default());
        let mint = MintArgs { machine: Some("m".into()), count: 1, json: false };
        dispatch_with_context(&Command::Id(mint), &ctx).unwrap();

        clock.set(Utc.timestamp_millis_opt(4_000).unwrap());
        let mint = MintArgs { machine: Some("m".into()), count: 1, json: false };
        let err = dispatch_with_context(&Command::Id(mint), &ctx).unwrap_err();
        assert!(err.contains("clock moved backwards"));
    }
}
