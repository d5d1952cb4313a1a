//! Lexical analysis of dialect source text
//!
//! Splits source into a flat token stream whose concatenated text reproduces
//! the (normalized) source. Classification is line-oriented; see `analyzer`
//! for how logical lines and multi-line literals interact.

pub mod analyzer;
pub mod classifier;
pub mod error;
pub mod lines;
pub mod multiline;

use crate::config::compile_time::lexical::MAX_TOKEN_COUNT;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::TokenStream;

pub use analyzer::{LexicalAnalyzer, LexicalMetrics};
pub use classifier::{classify, is_identifier};
pub use error::LexerError;
pub use lines::{assemble_logical_line, normalize_line_endings, LogicalLine, PhysicalLines};
pub use multiline::{collect_multiline_string, CollectedString};

/// Tokenize with default preferences
pub fn tokenize(source: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

pub fn tokenize_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::with_preferences(preferences).tokenize(source)
}

/// Check that every lexical error code is registered and the token limit is sane
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let lexical_codes = [
        codes::lexical::LEXICAL_FAILURE,
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::UNTERMINATED_CONTINUATION,
        codes::lexical::TOO_MANY_TOKENS,
    ];

    for code in &lexical_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    if MAX_TOKEN_COUNT == 0 {
        return Err("MAX_TOKEN_COUNT cannot be zero".to_string());
    }

    crate::log_debug!("Lexical limits initialized", "max_token_count" => MAX_TOKEN_COUNT);
    Ok(())
}
