//! Translator from the Chinese-keyword Python dialect (`.pyzh`) to standard
//! Python.
//!
//! Sources are tokenized line by line, dialect keywords are substituted
//! through a [`grammar::KeywordTable`], and the result is prefixed with a
//! wildcard import of the runtime support module.

pub mod batch;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod tokens;
pub mod translation;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchJob, BatchResults};
pub use grammar::{KeywordTable, KeywordTableError};
pub use lexical::{tokenize, LexerError};
pub use pipeline::{PipelineError, PipelineResult};
pub use tokens::{Token, TokenCategory, TokenStream};
pub use translation::{translate, Preamble, Translator};
