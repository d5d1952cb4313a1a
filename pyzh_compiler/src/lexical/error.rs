use crate::logging::{codes, Code};
use crate::utils::Position;

/// Fatal lexical errors. Each aborts translation of the current file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("no token rule matches {found} at {position}")]
    LexicalFailure { found: String, position: Position },

    #[error("continuation marker at {position} is not followed by another line")]
    UnterminatedContinuation { position: Position },

    #[error("multi-line string opened with {delimiter} at {position} is never closed")]
    UnterminatedString {
        delimiter: &'static str,
        position: Position,
    },

    #[error("too many tokens: {count} (max {max})")]
    TooManyTokens { count: usize, max: usize },
}

impl LexerError {
    pub fn error_code(&self) -> Code {
        match self {
            LexerError::LexicalFailure { .. } => codes::lexical::LEXICAL_FAILURE,
            LexerError::UnterminatedContinuation { .. } => {
                codes::lexical::UNTERMINATED_CONTINUATION
            }
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// Source position the error points at, when it has one
    pub fn position(&self) -> Option<Position> {
        match self {
            LexerError::LexicalFailure { position, .. }
            | LexerError::UnterminatedContinuation { position }
            | LexerError::UnterminatedString { position, .. } => Some(*position),
            LexerError::TooManyTokens { .. } => None,
        }
    }
}

/// Human-readable description of what sits at the start of `rest`
pub(crate) fn describe_found(rest: &str) -> String {
    match rest.chars().next() {
        Some(c) if c.is_control() => format!("'{}'", c.escape_default()),
        Some(c) => format!("'{}'", c),
        None => "end of line".to_string(),
    }
}
