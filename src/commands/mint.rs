//! `sortid id` and `sortid short` commands.

use serde::Serialize;

use crate::cli::MintArgs;
use crate::context::ServiceContext;
use crate::error::GenerateError;
use crate::generator::resolution::Resolution;
use crate::ports::IdGenerator;

/// JSON output of a mint command.
#[derive(Debug, Serialize)]
pub struct MintReport {
    /// Machine id embedded in every identifier.
    pub machine_id: String,
    /// Resolution the identifiers were minted at.
    pub resolution: Resolution,
    /// Identifiers in the order they were minted.
    pub ids: Vec<String>,
}

/// Mints `count` identifiers for `machine_id`.
///
/// # Errors
///
/// Stops at the first generator failure.
pub fn mint(
    ids: &dyn IdGenerator,
    machine_id: &str,
    resolution: Resolution,
    count: u32,
) -> Result<Vec<String>, GenerateError> {
    (0..count)
        .map(|_| match resolution {
            Resolution::Millis => ids.create_id(machine_id),
            Resolution::Seconds => ids.create_short_id(machine_id),
        })
        .collect()
}

/// Execute a mint command.
///
/// # Errors
///
/// Returns an error string if minting or JSON encoding fails.
pub fn run(ctx: &ServiceContext, args: &MintArgs, resolution: Resolution) -> Result<(), String> {
    let machine_id = ctx.machine_id(args.machine.as_deref());
    let ids = mint(ctx.ids.as_ref(), &machine_id, resolution, args.count)
        .map_err(|e| e.to_string())?;

    if args.json {
        let report = MintReport { machine_id, resolution, ids };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to encode mint report: {e}"))?;
        println!("{json}");
    } else {
        for id in ids {
            println!("{id}");
        }
    }
    Ok(())
}
