//! Port traits defining external boundaries.
//!
//! Each trait separates the generator core from something it does not own:
//! the time source and the callers that consume identifiers.
//! Implementations live in `src/adapters/` and `src/generator/`.

pub mod clock;
pub mod id_gen;

pub use clock::Clock;
pub use id_gen::IdGenerator;
