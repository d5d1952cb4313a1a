//! Whole-file translation
//!
//! Tokenizes a source text, maps each token through the keyword table and
//! prepends the import line for the runtime support module.

use super::mapper::{is_substituted, substitute};
use crate::config::runtime::{LexicalPreferences, TranslationPreferences};
use crate::grammar::KeywordTable;
use crate::lexical::{LexerError, LexicalAnalyzer, LexicalMetrics};
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_performance, log_success};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

pub const DEFAULT_RUNTIME_MODULE: &str = "python内建函数";

/// Wildcard import of the runtime support module, placed before every
/// generated body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preamble {
    runtime_module: String,
}

impl Default for Preamble {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_MODULE)
    }
}

impl Preamble {
    pub fn new(runtime_module: impl Into<String>) -> Self {
        Self {
            runtime_module: runtime_module.into(),
        }
    }

    pub fn from_preferences(preferences: &TranslationPreferences) -> Self {
        Self::new(preferences.runtime_module.clone())
    }

    pub fn runtime_module(&self) -> &str {
        &self.runtime_module
    }

    /// The import statement without a line terminator
    pub fn line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Preamble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {} import *", self.runtime_module)
    }
}

/// Result of one translation with the intermediate token stream
#[derive(Debug, Clone, Serialize)]
pub struct TranslationReport {
    pub output: String,
    pub tokens: TokenStream,
    /// Identifier tokens rewritten to canonical keywords
    pub substitutions: usize,
    pub metrics: LexicalMetrics,
}

impl TranslationReport {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

/// Translate `source` to canonical text, preamble included
pub fn translate(
    source: &str,
    table: &KeywordTable,
    preamble: &Preamble,
) -> Result<String, LexerError> {
    Translator::new(table, preamble.clone()).translate(source)
}

/// Translation settings for a run; holds no per-file state, so one
/// translator can serve any number of files
#[derive(Debug, Clone)]
pub struct Translator<'t> {
    table: &'t KeywordTable,
    preamble: Preamble,
    preferences: LexicalPreferences,
}

impl<'t> Translator<'t> {
    pub fn new(table: &'t KeywordTable, preamble: Preamble) -> Self {
        Self {
            table,
            preamble,
            preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_lexical_preferences(mut self, preferences: LexicalPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn table(&self) -> &KeywordTable {
        self.table
    }

    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    pub fn translate(&self, source: &str) -> Result<String, LexerError> {
        Ok(self.translate_detailed(source)?.output)
    }

    pub fn translate_detailed(&self, source: &str) -> Result<TranslationReport, LexerError> {
        let start = Instant::now();
        let mut analyzer = LexicalAnalyzer::with_preferences(self.preferences.clone());
        let tokens = analyzer.tokenize(source)?;

        let (output, substitutions) = self.render(&tokens);

        log_success!(codes::success::TRANSLATION_COMPLETE, "Translation completed",
            "tokens" => tokens.len(),
            "substitutions" => substitutions
        );
        log_performance!(codes::success::TRANSLATION_COMPLETE, "Translation timing",
            duration = start.elapsed(),
            "output_bytes" => output.len()
        );

        Ok(TranslationReport {
            output,
            tokens,
            substitutions,
            metrics: analyzer.metrics().clone(),
        })
    }

    /// Preamble line followed by the substituted token texts
    pub fn render(&self, tokens: &TokenStream) -> (String, usize) {
        let preamble = self.preamble.line();
        let capacity = preamble.len() + 1 + tokens.iter().map(|t| t.len()).sum::<usize>();
        let mut output = String::with_capacity(capacity);
        output.push_str(&preamble);
        output.push('\n');

        let mut substitutions = 0;
        for token in tokens {
            if is_substituted(token, self.table) {
                substitutions += 1;
            }
            output.push_str(substitute(token, self.table));
        }
        (output, substitutions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const PREAMBLE: &str = "from python内建函数 import *\n";

    fn run(source: &str) -> String {
        translate(source, &KeywordTable::builtin(), &Preamble::default()).unwrap()
    }

    #[test]
    fn test_preamble() {
        assert_eq!(Preamble::default().line(), "from python内建函数 import *");
        assert_eq!(Preamble::new("运行库").to_string(), "from 运行库 import *");
    }

    #[test]
    fn test_empty_source_is_preamble_only() {
        assert_eq!(run(""), PREAMBLE);
    }

    #[test]
    fn test_end_to_end_example() {
        let source = "定义 f(x):\n    若 x 恒久的: 结果为 x\n";
        let expected = format!("{PREAMBLE}def f(x):\n    if x True: return x\n");
        assert_eq!(run(source), expected);
    }

    #[test]
    fn test_synonyms_map_to_one_keyword() {
        let output = run("当 真: pass\n循环 对的: pass\n");
        assert!(output.ends_with("while True: pass\nwhile True: pass\n"));
    }

    #[test]
    fn test_literals_are_untouched() {
        let source = "若 x: print('若 真') # 否则 假\ny = \"\"\"\n结果为 若\n\"\"\"\n";
        let expected = format!(
            "{PREAMBLE}if x: print('若 真') # 否则 假\ny = \"\"\"\n结果为 若\n\"\"\"\n"
        );
        assert_eq!(run(source), expected);
    }

    #[test]
    fn test_identity_table_reproduces_source() {
        let empty = KeywordTable::from_entries(Vec::<(String, String)>::new()).unwrap();
        let source = "从 os 导入 path\n若 x:\n    y = r'\\d+' + f\"{z}\"  # 注\n";
        let output = translate(source, &empty, &Preamble::default()).unwrap();
        assert_eq!(output, format!("{PREAMBLE}{source}"));
    }

    #[test]
    fn test_continuation_folds_before_substitution() {
        let output = run("若 a 和 \\\n   b:\n    pass\n");
        assert!(output.ends_with("if a 和  b:\n    pass\n"));
    }

    #[test]
    fn test_missing_trailing_newline_gets_one() {
        assert_eq!(run("结果为 1"), format!("{PREAMBLE}return 1\n"));
    }

    #[test]
    fn test_detailed_report() {
        let table = KeywordTable::builtin();
        let translator = Translator::new(&table, Preamble::default());
        let report = translator.translate_detailed("若 x: 结果为 假\n").unwrap();
        assert_eq!(report.substitutions, 3);
        assert_eq!(report.token_count(), 9);
        assert_eq!(report.metrics.total_tokens, 9);
        assert_eq!(report.output, format!("{PREAMBLE}if x: return False\n"));
    }

    #[test]
    fn test_errors_propagate() {
        let err = run_err("x = '''开始\n");
        assert_matches!(err, LexerError::UnterminatedString { .. });
        let err = run_err("若 x \\");
        assert_matches!(err, LexerError::UnterminatedContinuation { .. });
        let err = run_err("x = $`\n");
        assert_matches!(err, LexerError::LexicalFailure { .. });
    }

    fn run_err(source: &str) -> LexerError {
        translate(source, &KeywordTable::builtin(), &Preamble::default()).unwrap_err()
    }
}
