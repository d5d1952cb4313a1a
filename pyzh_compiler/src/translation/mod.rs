//! Dialect-to-canonical translation

pub mod driver;
pub mod mapper;

pub use driver::{translate, Preamble, TranslationReport, Translator, DEFAULT_RUNTIME_MODULE};
pub use mapper::{is_substituted, substitute};
