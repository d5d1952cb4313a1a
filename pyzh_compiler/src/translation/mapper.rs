//! Keyword substitution over single tokens

use crate::grammar::KeywordTable;
use crate::tokens::Token;

/// Output text for `token`: the canonical keyword when the token is an
/// identifier spelled exactly like a table key, the token's own text otherwise.
pub fn substitute<'a>(token: &'a Token, table: &'a KeywordTable) -> &'a str {
    if token.is_identifier() {
        if let Some(canonical) = table.get(&token.text) {
            return canonical;
        }
    }
    &token.text
}

/// True if `substitute` would rewrite `token`
pub fn is_substituted(token: &Token, table: &KeywordTable) -> bool {
    token.is_identifier() && table.contains(&token.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenCategory;

    #[test]
    fn test_identifier_in_table_is_replaced() {
        let table = KeywordTable::builtin();
        let token = Token::identifier("结果为");
        assert_eq!(substitute(&token, &table), "return");
        assert!(is_substituted(&token, &table));
    }

    #[test]
    fn test_only_whole_identifiers_match() {
        let table = KeywordTable::builtin();
        assert_eq!(substitute(&Token::identifier("若干"), &table), "若干");
        assert_eq!(substitute(&Token::identifier("x若"), &table), "x若");
    }

    #[test]
    fn test_non_identifiers_pass_through() {
        let table = KeywordTable::builtin();
        for token in [
            Token::new(TokenCategory::String, "'若'"),
            Token::new(TokenCategory::Comment, "# 若"),
            Token::new(TokenCategory::MultiLineString, "'''若\n否则'''"),
            Token::operator(":"),
            Token::space("  "),
        ] {
            assert_eq!(substitute(&token, &table), token.text);
            assert!(!is_substituted(&token, &table));
        }
    }

    #[test]
    fn test_canonical_text_is_a_fixed_point() {
        let table = KeywordTable::builtin();
        for (dialect, _) in table.iter() {
            let once = substitute(&Token::identifier(dialect), &table).to_string();
            let token = Token::identifier(once.as_str());
            let twice = substitute(&token, &table);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = KeywordTable::from_entries([("Print", "print")]).unwrap();
        assert_eq!(substitute(&Token::identifier("print"), &table), "print");
        assert_eq!(substitute(&Token::identifier("PRINT"), &table), "PRINT");
    }
}
