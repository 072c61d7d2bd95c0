//! Trace identifiers for log correlation.
//!
//! Inbound requests may carry a trace id in [`TRACE_HEADER`]. When they do
//! not, one is minted so every log line of the request can still be tied
//! together.

use tracing::Span;

use crate::error::GenerateError;
use crate::ports::IdGenerator;

/// Request header carrying an upstream trace id.
pub const TRACE_HEADER: &str = "X-Trace-Id";

/// Machine id used when minting trace ids without a configured one.
pub const DEFAULT_TRACE_MACHINE_ID: &str = "0";

/// Returns the header value when present and non-blank, otherwise a freshly
/// minted millisecond identifier for `machine_id`.
///
/// # Errors
///
/// Propagates generator failures when an id has to be minted.
pub fn resolve_trace_id(
    header: Option<&str>,
    ids: &dyn IdGenerator,
    machine_id: &str,
) -> Result<String, GenerateError> {
    match header.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(value.to_string()),
        None => {
            let minted = ids.create_id(machine_id)?;
            tracing::debug!(trace_id = %minted, header = TRACE_HEADER, "header absent, minted trace id");
            Ok(minted)
        }
    }
}

/// Span that stamps `trace_id` on every event recorded inside it.
#[must_use]
pub fn correlation_span(trace_id: &str) -> Span {
    tracing::info_span!("request", trace_id = %trace_id)
}
