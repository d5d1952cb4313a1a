//! Shared source-location types used by the lexer and error reporting.

pub mod span;

pub use span::{Position, SourceMap, Span};
