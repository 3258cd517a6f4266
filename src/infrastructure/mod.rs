//! Infrastructure layer
//!
//! Concrete implementations of the domain traits plus process-level setup.

pub mod logging;
pub mod parsing;
