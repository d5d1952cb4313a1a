//! Collection of triple-quoted literals spanning several physical lines

use super::classifier::find_closing;
use super::error::LexerError;
use super::lines::{PhysicalLine, PhysicalLines};
use crate::tokens::{Token, TokenCategory};
use crate::utils::Position;

/// A multi-line literal and where scanning resumes after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedString<'a> {
    pub token: Token,
    /// Raw physical line holding the closing delimiter
    pub closing_line: PhysicalLine<'a>,
    /// Byte offset just past the closing delimiter within `closing_line`
    pub resume_offset: usize,
}

impl CollectedString<'_> {
    /// Unscanned remainder of the closing line
    pub fn remainder(&self) -> &str {
        &self.closing_line.text[self.resume_offset..]
    }
}

/// Collect a triple-quoted literal whose opener starts `opening`, which is
/// the rest of the logical line from the opener on.
///
/// Following physical lines are taken verbatim (no trimming, no continuation
/// folding) until one contains an unescaped `delimiter`. The token text is
/// the opening text and the consumed lines joined with `\n`, ending with the
/// closing delimiter.
pub fn collect_multiline_string<'a>(
    opening: &str,
    delimiter: &'static str,
    opened_at: Position,
    lines: &mut PhysicalLines<'a>,
) -> Result<CollectedString<'a>, LexerError> {
    let mut text = String::from(opening);

    for line in lines.by_ref() {
        text.push('\n');
        match find_closing(line.text, delimiter) {
            Some(index) => {
                let end = index + delimiter.len();
                text.push_str(&line.text[..end]);
                return Ok(CollectedString {
                    token: Token::new(TokenCategory::MultiLineString, text),
                    closing_line: line,
                    resume_offset: end,
                });
            }
            None => text.push_str(line.text),
        }
    }

    Err(LexerError::UnterminatedString {
        delimiter,
        position: opened_at,
    })
}
