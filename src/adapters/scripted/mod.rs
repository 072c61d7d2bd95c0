//! Scripted adapters that serve predetermined values.

pub mod clock;

pub use clock::ScriptedClock;
