use serde::{Deserialize, Serialize};
use std::fmt;

/// Triple-quote delimiters recognised by the lexer
pub const TRIPLE_DELIMITERS: [&str; 2] = ["\"\"\"", "'''"];

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenCategory {
    Identifier,
    Comment,
    String,
    MultiLineString,
    Operator,
    Number,
    Space,
    LineBreak,
}

impl TokenCategory {
    pub const ALL: [TokenCategory; 8] = [
        TokenCategory::Identifier,
        TokenCategory::Comment,
        TokenCategory::String,
        TokenCategory::MultiLineString,
        TokenCategory::Operator,
        TokenCategory::Number,
        TokenCategory::Space,
        TokenCategory::LineBreak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::Identifier => "identifier",
            TokenCategory::Comment => "comment",
            TokenCategory::String => "string",
            TokenCategory::MultiLineString => "multiline_string",
            TokenCategory::Operator => "operator",
            TokenCategory::Number => "number",
            TokenCategory::Space => "space",
            TokenCategory::LineBreak => "line_break",
        }
    }

    /// Layout tokens carry no program content
    pub fn is_layout(&self) -> bool {
        matches!(self, TokenCategory::Space | TokenCategory::LineBreak)
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified lexeme with the exact source text it covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub category: TokenCategory,
    pub text: String,
}

impl Token {
    pub fn new(category: TokenCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    pub fn identifier(text: impl Into<String>) -> Self {
        Self::new(TokenCategory::Identifier, text)
    }

    pub fn space(text: impl Into<String>) -> Self {
        Self::new(TokenCategory::Space, text)
    }

    pub fn operator(text: impl Into<String>) -> Self {
        Self::new(TokenCategory::Operator, text)
    }

    /// The synthetic token appended after every logical line
    pub fn line_break() -> Self {
        Self::new(TokenCategory::LineBreak, "\n")
    }

    pub fn is_identifier(&self) -> bool {
        self.category == TokenCategory::Identifier
    }

    /// Triple-quote delimiter of a `MultiLineString` token, if any.
    pub fn delimiter(&self) -> Option<&'static str> {
        if self.category != TokenCategory::MultiLineString {
            return None;
        }
        let body = strip_modifier(&self.text);
        TRIPLE_DELIMITERS
            .into_iter()
            .find(|delim| body.starts_with(delim))
    }

    /// Delimiter of a `MultiLineString` whose text is only the opening
    /// delimiter (plus an optional modifier letter), meaning the literal
    /// continues on following physical lines.
    pub fn open_delimiter(&self) -> Option<&'static str> {
        self.delimiter()
            .filter(|delim| strip_modifier(&self.text) == *delim)
    }

    pub fn is_unterminated_opener(&self) -> bool {
        self.open_delimiter().is_some()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Strip a single leading string modifier letter, if present.
pub(crate) fn strip_modifier(text: &str) -> &str {
    match text.chars().next() {
        Some(c) if is_string_modifier(c) => &text[c.len_utf8()..],
        _ => text,
    }
}

/// Letters that may prefix a quoted literal
pub fn is_string_modifier(c: char) -> bool {
    matches!(c, 'f' | 'F' | 'r' | 'R' | 'b' | 'B' | 'u' | 'U')
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unterminated_opener_detection() {
        let opener = Token::new(TokenCategory::MultiLineString, "'''");
        assert!(opener.is_unterminated_opener());
        assert_eq!(opener.delimiter(), Some("'''"));

        let prefixed = Token::new(TokenCategory::MultiLineString, "r\"\"\"");
        assert!(prefixed.is_unterminated_opener());
        assert_eq!(prefixed.delimiter(), Some("\"\"\""));

        let closed = Token::new(TokenCategory::MultiLineString, "''''''");
        assert!(!closed.is_unterminated_opener());

        let plain = Token::new(TokenCategory::String, "'''");
        assert!(!plain.is_unterminated_opener());
    }

    #[test]
    fn test_category_groups() {
        assert!(TokenCategory::Space.is_layout());
        assert!(TokenCategory::LineBreak.is_layout());
        assert!(!TokenCategory::Comment.is_layout());
        assert_eq!(TokenCategory::ALL.len(), 8);
    }

    #[test]
    fn test_token_serializes_with_category() {
        let json = serde_json::to_string(&Token::identifier("若")).unwrap();
        assert_eq!(json, r#"{"category":"Identifier","text":"若"}"#);
    }
}
