//! Source location tracking
//!
//! Positions are expressed in physical source lines and 1-based character
//! columns. Lexical errors carry a `Position`; log events carry a `Span`.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset within the scanned line (0-based)
    pub offset: usize,
    /// Physical line number (1-based)
    pub line: u32,
    /// Character column (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Offset 0, line 1, column 1
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Position of byte `offset` within `line_text`, which is physical line `line`.
    ///
    /// `offset` must fall on a character boundary.
    pub fn in_line(line_text: &str, offset: usize, line: u32) -> Self {
        let column = line_text[..offset].chars().count() as u32 + 1;
        Self::new(offset, line, column)
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position over a string
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A span covering the single character at `pos`
    pub fn single(pos: Position) -> Self {
        Self {
            start: pos,
            end: Position::new(pos.offset + 1, pos.line, pos.column + 1),
        }
    }

    /// Span covering `text` starting at `start`
    pub fn covering(start: Position, text: &str) -> Self {
        Self::new(start, start.advance_str(text))
    }

    pub fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_multiline() {
            write!(f, "{}-{}", self.start, self.end)
        } else {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        }
    }
}

/// Terminal cell width of a character, counting CJK ideographs and
/// fullwidth forms as two cells so carets line up under them.
fn display_width(ch: char) -> usize {
    match ch {
        '\u{1100}'..='\u{115f}'
        | '\u{2e80}'..='\u{a4cf}'
        | '\u{ac00}'..='\u{d7a3}'
        | '\u{f900}'..='\u{faff}'
        | '\u{fe30}'..='\u{fe4f}'
        | '\u{ff00}'..='\u{ff60}'
        | '\u{ffe0}'..='\u{ffe6}' => 2,
        _ => 1,
    }
}

/// Line index over a source text, used to render error snippets.
#[derive(Debug, Clone)]
pub struct SourceMap {
    source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get a line of text by line number (1-based), without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let line_idx = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());

        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Format an error message with the offending line and a caret under `position`
    pub fn format_error(&self, file: &str, position: Position, message: &str) -> String {
        let mut result = format!("error: {}\n  --> {}:{}\n", message, file, position);

        if let Some(line) = self.get_line(position.line) {
            let line_num_str = position.line.to_string();
            let padding = " ".repeat(line_num_str.len());

            let indent: usize = line
                .chars()
                .take(position.column.saturating_sub(1) as usize)
                .map(display_width)
                .sum();

            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));
            result.push_str(&format!("{} | {}^\n", padding, " ".repeat(indent)));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_in_line_counts_characters() {
        let pos = Position::in_line("若 x", "若 ".len(), 3);
        assert_eq!(pos.line, 3);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.to_string(), "3:3");
    }

    #[test]
    fn test_span_covering_multiline_text() {
        let span = Span::covering(Position::start(), "'''a\nb'''");
        assert!(span.is_multiline());
        assert_eq!(span.end.line, 2);
        assert_eq!(span.end.column, 5);
    }

    #[test]
    fn test_source_map_lines() {
        let map = SourceMap::new("first\nsecond\n");
        assert_eq!(map.get_line(1), Some("first"));
        assert_eq!(map.get_line(2), Some("second"));
        assert_eq!(map.get_line(3), Some(""));
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.get_line(9), None);
    }

    #[test]
    fn test_format_error_aligns_caret_under_wide_characters() {
        let map = SourceMap::new("若 x ` y");
        let rendered = map.format_error("a.pyzh", Position::new(6, 1, 5), "unexpected character");
        assert!(rendered.contains("--> a.pyzh:1:5"));
        // 若 occupies two cells, followed by " x " (three cells)
        assert!(rendered.ends_with("\n  |      ^\n"));
    }
}
