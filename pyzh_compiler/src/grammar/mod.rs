//! Dialect grammar data

pub mod keywords;

pub use keywords::{KeywordTable, KeywordTableError, DEFAULT_KEYWORDS};
