//! Domain layer
//!
//! Document structure types, parser configuration and traits, and the error
//! taxonomy. Nothing here performs I/O.

pub mod document;
pub mod error;
pub mod parsing;

pub use error::{ErrorCategory, ErrorCode, ParseError, SourceLocation};
