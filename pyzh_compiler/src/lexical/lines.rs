//! Physical and logical source lines
//!
//! A logical line is one physical line, or several joined by a trailing
//! continuation marker. Multi-line string bodies bypass this layer and read
//! raw physical lines directly from the same `PhysicalLines` cursor.

use super::error::LexerError;
use crate::utils::Position;
use std::borrow::Cow;

pub const CONTINUATION_MARKER: char = '\\';

/// Convert `\r\n` and lone `\r` line endings to `\n`
pub fn normalize_line_endings(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalLine<'a> {
    /// 1-based line number
    pub number: u32,
    /// Line text without its terminator
    pub text: &'a str,
}

/// Cursor over the physical lines of normalized source text.
/// A final line terminator does not produce an extra empty line.
#[derive(Debug, Clone)]
pub struct PhysicalLines<'a> {
    lines: std::str::Lines<'a>,
    consumed: u32,
}

impl<'a> PhysicalLines<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            consumed: 0,
        }
    }

    /// Number of physical lines read so far
    pub fn consumed(&self) -> u32 {
        self.consumed
    }
}

impl<'a> Iterator for PhysicalLines<'a> {
    type Item = PhysicalLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.lines.next()?;
        self.consumed += 1;
        Some(PhysicalLine {
            number: self.consumed,
            text,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine<'a> {
    /// Right-trimmed text with continuation markers folded away
    pub text: Cow<'a, str>,
    /// Physical line the logical line starts on
    pub first_line: u32,
    /// Physical line the logical line ends on
    pub last_line: u32,
}

impl LogicalLine<'_> {
    pub fn physical_line_count(&self) -> u32 {
        self.last_line - self.first_line + 1
    }

    pub fn is_folded(&self) -> bool {
        self.last_line > self.first_line
    }
}

/// Read the next logical line.
///
/// Trailing whitespace is dropped. While the text ends with the continuation
/// marker, the marker is removed and the next physical line, trimmed on both
/// sides, is appended after a single space. Returns `Ok(None)` at end of input.
pub fn assemble_logical_line<'a>(
    lines: &mut PhysicalLines<'a>,
) -> Result<Option<LogicalLine<'a>>, LexerError> {
    let Some(first) = lines.next() else {
        return Ok(None);
    };

    let mut text = Cow::Borrowed(first.text.trim_end());
    let mut last = first;

    while text.ends_with(CONTINUATION_MARKER) {
        let marker = text.len() - CONTINUATION_MARKER.len_utf8();
        let Some(next) = lines.next() else {
            let trimmed = last.text.trim_end();
            let offset = trimmed.len() - CONTINUATION_MARKER.len_utf8();
            return Err(LexerError::UnterminatedContinuation {
                position: Position::in_line(trimmed, offset, last.number),
            });
        };

        let joined = text.to_mut();
        joined.truncate(marker);
        joined.push(' ');
        joined.push_str(next.text.trim());
        last = next;
    }

    Ok(Some(LogicalLine {
        text,
        first_line: first.number,
        last_line: last.number,
    }))
}
