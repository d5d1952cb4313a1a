//! Token classification at a cursor position within one line
//!
//! Matchers are tried in a fixed priority order and the first match wins:
//! whitespace, comment, operator run, quoted literal, identifier, number.
//! Quote characters never appear in the operator set, and a modifier letter
//! only starts a literal when a quote follows it, so the ordering settles
//! every overlap between punctuation, prefixes and names.

use super::error::{describe_found, LexerError};
use crate::tokens::token::{strip_modifier, TRIPLE_DELIMITERS};
use crate::tokens::{Token, TokenCategory};
use crate::utils::Position;
use std::ops::RangeInclusive;

pub const COMMENT_MARKER: char = '#';

/// Characters that form operator and punctuation runs
pub const OPERATOR_CHARS: &str = ".,!?;:(){}<>[]@#$%^&*+=\\|~-/";

/// Non-Latin identifier alphabet: the CJK Unified Ideographs block
pub const EXTENDED_IDENTIFIER_RANGES: &[RangeInclusive<char>] = &['\u{4e00}'..='\u{9fff}'];

type Matcher = fn(&str) -> Option<Token>;

const MATCHERS: [(&str, Matcher); 6] = [
    ("whitespace", match_whitespace),
    ("comment", match_comment),
    ("operator", match_operator),
    ("quoted", match_quoted),
    ("identifier", match_identifier),
    ("number", match_number),
];

/// Classify the token starting at byte `position` of `text`.
///
/// `line` is the physical line number used for error positions. The returned
/// token's text is a non-empty prefix of `text[position..]`.
pub fn classify(text: &str, position: usize, line: u32) -> Result<Token, LexerError> {
    let rest = &text[position..];

    MATCHERS
        .iter()
        .find_map(|(_, matcher)| matcher(rest))
        .ok_or_else(|| LexerError::LexicalFailure {
            found: describe_found(rest),
            position: Position::in_line(text, position, line),
        })
}

fn is_extended_identifier_char(c: char) -> bool {
    EXTENDED_IDENTIFIER_RANGES.iter().any(|range| range.contains(&c))
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || is_extended_identifier_char(c)
}

pub fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

pub fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(c)
}

/// True if `text` is exactly one identifier token
pub fn is_identifier(text: &str) -> bool {
    match_identifier(text).is_some_and(|token| token.text.len() == text.len())
}

/// Byte index of the first unescaped occurrence of `delimiter` in `text`.
/// A backslash escapes the character that follows it.
pub(crate) fn find_closing(text: &str, delimiter: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    while let Some((index, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if text[index..].starts_with(delimiter) {
            return Some(index);
        }
    }
    None
}

fn run_length(rest: &str, accept: impl Fn(char) -> bool) -> usize {
    rest.find(|c: char| !accept(c)).unwrap_or(rest.len())
}

fn match_whitespace(rest: &str) -> Option<Token> {
    let end = run_length(rest, char::is_whitespace);
    (end > 0).then(|| Token::space(&rest[..end]))
}

fn match_comment(rest: &str) -> Option<Token> {
    rest.starts_with(COMMENT_MARKER)
        .then(|| Token::new(TokenCategory::Comment, rest))
}

fn match_operator(rest: &str) -> Option<Token> {
    let end = run_length(rest, is_operator_char);
    (end > 0).then(|| Token::operator(&rest[..end]))
}

/// Quoted literal with an optional modifier letter. A triple delimiter is
/// tried before a single quote, so `'''` always opens a triple-quoted
/// literal; when it is not closed on this line the token is the bare opener.
fn match_quoted(rest: &str) -> Option<Token> {
    let body = strip_modifier(rest);
    let prefix_len = rest.len() - body.len();

    if let Some(delim) = TRIPLE_DELIMITERS.into_iter().find(|d| body.starts_with(d)) {
        let opener_end = prefix_len + delim.len();
        let end = match find_closing(&rest[opener_end..], delim) {
            Some(index) => opener_end + index + delim.len(),
            None => opener_end,
        };
        return Some(Token::new(TokenCategory::MultiLineString, &rest[..end]));
    }

    let quote = body.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let opener_end = prefix_len + quote.len_utf8();
    let mut buf = [0u8; 4];
    let index = find_closing(&rest[opener_end..], quote.encode_utf8(&mut buf))?;
    let end = opener_end + index + quote.len_utf8();
    Some(Token::new(TokenCategory::String, &rest[..end]))
}

fn match_identifier(rest: &str) -> Option<Token> {
    let first = rest.chars().next()?;
    if !is_identifier_start(first) {
        return None;
    }
    let tail = &rest[first.len_utf8()..];
    let end = first.len_utf8() + run_length(tail, is_identifier_continue);
    Some(Token::identifier(&rest[..end]))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Optional sign, digits with an optional fraction, optional exponent.
/// A trailing `.` without fraction digits and an `e` without exponent
/// digits are left for the next token.
fn match_number(rest: &str) -> Option<Token> {
    let bytes = rest.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = sign + count_digits(&bytes[sign..]);

    let fraction_digits = match bytes.get(int_end) {
        Some(b'.') => count_digits(&bytes[int_end + 1..]),
        _ => 0,
    };

    let mut end = if int_end > sign && fraction_digits > 0 {
        int_end + 1 + fraction_digits
    } else if int_end > sign {
        int_end
    } else {
        return None;
    };

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let digits = count_digits(&bytes[exponent..]);
        if digits > 0 {
            end = exponent + digits;
        }
    }

    Some(Token::new(TokenCategory::Number, &rest[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn first(text: &str) -> Token {
        classify(text, 0, 1).unwrap()
    }

    fn split(text: &str) -> Vec<(TokenCategory, String)> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        while offset < text.len() {
            let token = classify(text, offset, 1).unwrap();
            offset += token.text.len();
            tokens.push((token.category, token.text));
        }
        tokens
    }

    #[test]
    fn test_whitespace_run() {
        assert_eq!(first(" \t x"), Token::space(" \t "));
        assert_eq!(first("\u{3000}若"), Token::space("\u{3000}"));
    }

    #[test]
    fn test_comment_takes_rest_of_line() {
        let token = first("# 若 这是注释 'x'");
        assert_eq!(token.category, TokenCategory::Comment);
        assert_eq!(token.text, "# 若 这是注释 'x'");
    }

    #[test]
    fn test_comment_after_code() {
        let tokens = split("x#若");
        assert_eq!(tokens[1], (TokenCategory::Comment, "#若".to_string()));
    }

    #[test]
    fn test_operator_runs_are_greedy() {
        assert_eq!(first("):"), Token::operator("):"));
        assert_eq!(first("**= 2"), Token::operator("**="));
        assert_eq!(first("-x"), Token::operator("-"));
        assert_eq!(first("//2"), Token::operator("//"));
    }

    #[test]
    fn test_single_line_strings() {
        assert_eq!(first("'若' + x").text, "'若'");
        assert_eq!(first("\"a\" b").text, "\"a\"");
        assert_eq!(first("''").category, TokenCategory::String);
        assert_eq!(first("f'{x}'").text, "f'{x}'");
        assert_eq!(first("rb").category, TokenCategory::Identifier);
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        assert_eq!(first(r#""a\"b" c"#).text, r#""a\"b""#);
        assert_eq!(first(r"'\\' x").text, r"'\\'");
    }

    #[test]
    fn test_unterminated_single_quote_is_lexical_failure() {
        let err = classify("x = 'abc", 4, 7).unwrap_err();
        assert_matches!(err, LexerError::LexicalFailure { ref found, position }
            if found == "'''" && position.line == 7 && position.column == 5);
    }

    #[test]
    fn test_closed_triple_on_one_line() {
        let token = first("'''doc''' rest");
        assert_eq!(token.category, TokenCategory::MultiLineString);
        assert_eq!(token.text, "'''doc'''");
        assert!(!token.is_unterminated_opener());
    }

    #[test]
    fn test_unterminated_triple_yields_bare_opener() {
        let token = first("\"\"\"starts here");
        assert_eq!(token.category, TokenCategory::MultiLineString);
        assert_eq!(token.text, "\"\"\"");
        assert_eq!(token.open_delimiter(), Some("\"\"\""));

        let prefixed = first("r'''raw");
        assert_eq!(prefixed.text, "r'''");
        assert!(prefixed.is_unterminated_opener());
    }

    #[test]
    fn test_triple_quote_takes_priority_over_empty_string() {
        // Three quotes open a triple-quoted literal rather than `''` + `'`.
        let opener = first("'''abc");
        assert_eq!(opener.category, TokenCategory::MultiLineString);
        assert_eq!(opener.text, "'''");

        // Six quotes are one closed, empty triple-quoted literal.
        let empty = first("''''''");
        assert_eq!(empty.category, TokenCategory::MultiLineString);
        assert_eq!(empty.text, "''''''");

        // Two quotes followed by something else are an empty string.
        let tokens = split("'' x");
        assert_eq!(tokens[0], (TokenCategory::String, "''".to_string()));
    }

    #[test]
    fn test_identifiers_with_extended_alphabet() {
        assert_eq!(first("恒久的: x"), Token::identifier("恒久的"));
        assert_eq!(first("_变量1 = 2"), Token::identifier("_变量1"));
        assert_eq!(first("abc若def").text, "abc若def");
        assert!(is_identifier("结果为"));
        assert!(!is_identifier("若 x"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(first("42)").text, "42");
        assert_eq!(first("3.14 ").text, "3.14");
        assert_eq!(first("1e10").text, "1e10");
        assert_eq!(first("2.5E-3,").text, "2.5E-3");
        assert_eq!(first("1.").text, "1");
        assert_eq!(first("7e").text, "7");
        assert_eq!(split("0x1F"), vec![
            (TokenCategory::Number, "0".to_string()),
            (TokenCategory::Identifier, "x1F".to_string()),
        ]);
    }

    #[test]
    fn test_number_sign_when_called_directly() {
        assert_eq!(match_number("-12").map(|t| t.text), Some("-12".to_string()));
        assert_eq!(match_number("+2.5").map(|t| t.text), Some("+2.5".to_string()));
        assert_eq!(match_number(".5"), None);
        assert_eq!(match_number("-"), None);
    }

    #[test]
    fn test_unknown_character_fails_with_position() {
        let err = classify("若 x ` y", "若 x ".len(), 3).unwrap_err();
        assert_matches!(err, LexerError::LexicalFailure { ref found, position }
            if found == "'`'" && position.line == 3 && position.column == 5);

        let err = classify("a，b", 1, 1).unwrap_err();
        assert_matches!(err, LexerError::LexicalFailure { ref found, .. } if found == "'，'");
    }

    #[test]
    fn test_token_coverage_of_a_line() {
        let line = "定义 f(x, y=1.5): 结果为 x*y  # 注释 若";
        let joined: String = split(line).into_iter().map(|(_, text)| text).collect();
        assert_eq!(joined, line);
    }
}
