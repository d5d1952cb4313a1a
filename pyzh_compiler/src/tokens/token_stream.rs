//! Ordered token storage produced by the lexer

use crate::tokens::token::{Token, TokenCategory};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-category token counts
pub type CategoryCounts = BTreeMap<TokenCategory, usize>;

/// Flat, ordered token sequence for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tokens: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Concatenate every token's text in order
    pub fn concat_text(&self) -> String {
        let capacity = self.tokens.iter().map(Token::len).sum();
        self.tokens
            .iter()
            .fold(String::with_capacity(capacity), |mut out, token| {
                out.push_str(&token.text);
                out
            })
    }

    pub fn category_counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts::new();
        for token in &self.tokens {
            *counts.entry(token.category).or_insert(0) += 1;
        }
        counts
    }

    /// Tokens that are neither whitespace nor line breaks
    pub fn significant(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.category.is_layout())
    }

    /// Serialize the stream as pretty JSON for token dumps
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.tokens)
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TokenStream {
        vec![
            Token::identifier("若"),
            Token::space(" "),
            Token::identifier("x"),
            Token::operator(":"),
            Token::line_break(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_concat_text_reassembles_source() {
        assert_eq!(sample().concat_text(), "若 x:\n");
    }

    #[test]
    fn test_category_counts() {
        let counts = sample().category_counts();
        assert_eq!(counts.get(&TokenCategory::Identifier), Some(&2));
        assert_eq!(counts.get(&TokenCategory::Space), Some(&1));
        assert_eq!(counts.get(&TokenCategory::Number), None);
    }

    #[test]
    fn test_significant_skips_layout() {
        let stream = sample();
        let texts: Vec<&str> = stream.significant().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["若", "x", ":"]);
    }

    #[test]
    fn test_json_dump_lists_tokens() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"LineBreak\""));
        assert!(json.contains("\"若\""));
    }
}
