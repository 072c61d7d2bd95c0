//! ID generator port used by collaborators that need identifiers.

use crate::error::GenerateError;

/// Mints sortable identifiers for a machine id.
///
/// Collaborators such as trace-id resolution depend on this trait rather
/// than on `Generator` directly.
pub trait IdGenerator: Send + Sync {
    /// Mints a millisecond-resolution identifier with a 12-digit sequence.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::ClockRegressed`] when the clock moved backward
    /// and did not recover, or [`GenerateError::OverflowRetriesExhausted`] when
    /// no window had capacity within the retry budget.
    fn create_id(&self, machine_id: &str) -> Result<String, GenerateError>;

    /// Mints a second-resolution identifier with a 3-digit sequence.
    ///
    /// # Errors
    ///
    /// Same as [`IdGenerator::create_id`].
    fn create_short_id(&self, machine_id: &str) -> Result<String, GenerateError>;
}
