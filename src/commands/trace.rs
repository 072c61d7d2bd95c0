//! `sortid trace` command.

use crate::context::ServiceContext;
use crate::trace::{correlation_span, resolve_trace_id};

/// Resolves the trace id the command would print.
///
/// # Errors
///
/// Returns an error string if a trace id had to be minted and minting failed.
pub fn resolve(ctx: &ServiceContext, header: Option<&str>, machine: Option<&str>) -> Result<String, String> {
    let machine_id = ctx.machine_id(machine);
    resolve_trace_id(header, ctx.ids.as_ref(), &machine_id).map_err(|e| e.to_string())
}

/// Execute the `trace` command.
///
/// # Errors
///
/// Returns an error string if a trace id had to be minted and minting failed.
pub fn run(ctx: &ServiceContext, header: Option<&str>, machine: Option<&str>) -> Result<(), String> {
    let trace_id = resolve(ctx, header, machine)?;

    let _span = correlation_span(&trace_id).entered();
    tracing::info!(from_header = header.is_some_and(|h| !h.trim().is_empty()), "resolved trace id");
    println!("{trace_id}");
    Ok(())
}
