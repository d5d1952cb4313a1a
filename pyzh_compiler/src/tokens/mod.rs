//! Token system for dialect translation
//!
//! The lexer turns source text into a flat [`TokenStream`] of [`Token`]s.
//! Every token keeps the exact source text it covers, so concatenating a
//! stream reproduces the scanned input. Translation then rewrites only
//! `Identifier` tokens.
//!
//! ## Categories
//!
//! - `Identifier` - Latin or extended-alphabet names, including dialect keywords
//! - `Comment` - from the comment marker to the end of the line
//! - `String` - quoted literal closed on the same line
//! - `MultiLineString` - triple-quoted literal, possibly spanning lines
//! - `Operator` - run of punctuation characters
//! - `Number` - numeric literal
//! - `Space` - whitespace run inside a line
//! - `LineBreak` - synthetic token closing each logical line

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenCategory};
pub use token_stream::{CategoryCounts, TokenStream};
