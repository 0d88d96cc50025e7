//! Identifier validation
//!
//! Home of the [`Isrc`] value type. Validation is deliberately separate from
//! the backend grammars: the grammars only locate a candidate code inside a
//! tool's output line, while [`Isrc::parse`] decides whether the located
//! text is actually a well-formed code.

pub mod isrc;

pub use isrc::{Isrc, IsrcFormatError};
