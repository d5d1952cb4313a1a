//! Line-driven lexical analyzer
//!
//! Source text is read one logical line at a time. Each line is consumed by
//! repeated classification from a cursor; a triple-quoted opener hands control
//! to the multi-line collector, after which scanning resumes on the raw line
//! that closed the literal. A line break token follows every logical line.

use super::classifier::classify;
use super::error::LexerError;
use super::lines::{assemble_logical_line, normalize_line_endings, LogicalLine, PhysicalLines};
use super::multiline::collect_multiline_string;
use crate::config::compile_time::lexical::MAX_TOKEN_COUNT;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{CategoryCounts, Token, TokenStream};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_performance, log_success};
use serde::Serialize;
use std::time::Instant;

/// Counters gathered during one tokenization
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    /// Filled only when detailed metrics are enabled
    pub category_counts: CategoryCounts,
    pub physical_lines: u32,
    pub logical_lines: usize,
    /// Logical lines built from more than one physical line
    pub folded_lines: usize,
    pub multiline_strings: usize,
    /// Most physical lines spanned by a single multi-line literal
    pub longest_multiline_span: u32,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        if preferences.collect_detailed_metrics {
            *self.category_counts.entry(token.category).or_insert(0) += 1;
        }
    }

    pub(crate) fn record_line(&mut self, line: &LogicalLine<'_>) {
        self.logical_lines += 1;
        if line.is_folded() {
            self.folded_lines += 1;
        }
    }

    pub(crate) fn record_multiline(&mut self, first_line: u32, last_line: u32) {
        self.multiline_strings += 1;
        self.longest_multiline_span = self.longest_multiline_span.max(last_line - first_line + 1);
    }
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Metrics of the most recent `tokenize` call
    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize a whole source text.
    ///
    /// Concatenating the token texts reproduces the source with line endings
    /// normalized, trailing whitespace removed, continuation markers folded,
    /// and a newline after the last line.
    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();
        let start = Instant::now();
        let source = normalize_line_endings(source);

        log_debug!("Starting lexical analysis",
            "bytes" => source.len(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        match self.scan(&source) {
            Ok(tokens) => {
                log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
                    "tokens" => tokens.len(),
                    "logical_lines" => self.metrics.logical_lines,
                    "multiline_strings" => self.metrics.multiline_strings
                );
                log_performance!(codes::success::TOKENIZATION_COMPLETE, "Lexical analysis timing",
                    duration = start.elapsed(),
                    "physical_lines" => self.metrics.physical_lines
                );
                Ok(tokens)
            }
            Err(error) => {
                self.report(&error);
                Err(error)
            }
        }
    }

    fn scan(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        let mut lines = PhysicalLines::new(source);
        let mut tokens = TokenStream::new();

        while let Some(logical) = assemble_logical_line(&mut lines)? {
            self.metrics.record_line(&logical);
            self.scan_line(&logical, &mut lines, &mut tokens)?;
            self.push(&mut tokens, Token::line_break())?;
        }

        self.metrics.physical_lines = lines.consumed();
        Ok(tokens)
    }

    fn scan_line(
        &mut self,
        logical: &LogicalLine<'_>,
        lines: &mut PhysicalLines<'_>,
        tokens: &mut TokenStream,
    ) -> Result<(), LexerError> {
        let mut current: &str = &logical.text;
        let mut line_number = logical.first_line;
        let mut offset = 0;

        while offset < current.len() {
            let token = classify(current, offset, line_number)?;

            let Some(delimiter) = token.open_delimiter() else {
                offset += token.len();
                self.push(tokens, token)?;
                continue;
            };

            let opened_at = Position::in_line(current, offset, line_number);
            let collected =
                collect_multiline_string(&current[offset..], delimiter, opened_at, lines)?;

            self.metrics
                .record_multiline(line_number, collected.closing_line.number);
            if self.preferences.log_multiline_strings {
                log_success!(codes::success::MULTILINE_STRING_COLLECTED, "Collected multi-line string",
                    "opened_at" => opened_at,
                    "closed_at_line" => collected.closing_line.number,
                    "bytes" => collected.token.len()
                );
            }

            current = collected.closing_line.text;
            line_number = collected.closing_line.number;
            offset = collected.resume_offset;
            self.push(tokens, collected.token)?;
        }

        Ok(())
    }

    fn push(&mut self, tokens: &mut TokenStream, token: Token) -> Result<(), LexerError> {
        if tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexerError::TooManyTokens {
                count: tokens.len() + 1,
                max: MAX_TOKEN_COUNT,
            });
        }
        self.metrics.record_token(&token, &self.preferences);
        tokens.push(token);
        Ok(())
    }

    fn report(&self, error: &LexerError) {
        let message = error.to_string();
        let position = error
            .position()
            .filter(|_| self.preferences.include_position_in_errors);

        let span = position.map(|position| match error {
            LexerError::UnterminatedString { delimiter, .. } => Span::covering(position, delimiter),
            _ => Span::single(position),
        });

        match span {
            Some(span) => log_error!(error.error_code(), &message,
                span = span,
                "tokens_before_failure" => self.metrics.total_tokens
            ),
            None => log_error!(error.error_code(), &message,
                "tokens_before_failure" => self.metrics.total_tokens
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenCategory;
    use assert_matches::assert_matches;

    fn tokenize(source: &str) -> Result<TokenStream, LexerError> {
        LexicalAnalyzer::new().tokenize(source)
    }

    fn texts(stream: &TokenStream) -> Vec<&str> {
        stream.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_simple_line() {
        let stream = tokenize("若 x 恒久的:\n").unwrap();
        assert_eq!(texts(&stream), vec!["若", " ", "x", " ", "恒久的", ":", "\n"]);
        assert_eq!(stream.tokens()[6].category, TokenCategory::LineBreak);
    }

    #[test]
    fn test_empty_source() {
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_blank_lines_yield_line_breaks() {
        let stream = tokenize("\n   \nx").unwrap();
        assert_eq!(texts(&stream), vec!["\n", "\n", "x", "\n"]);
    }

    #[test]
    fn test_concatenation_reproduces_normalized_source() {
        let source = "定义 f(a, b=2):\r\n    结果为 a + b  # 求和  \r\n";
        let stream = tokenize(source).unwrap();
        assert_eq!(
            stream.concat_text(),
            "定义 f(a, b=2):\n    结果为 a + b  # 求和\n"
        );
    }

    #[test]
    fn test_continuation_is_folded_into_one_line() {
        let stream = tokenize("x = 1 + \\\n      2\n").unwrap();
        assert_eq!(stream.concat_text(), "x = 1 +  2\n");
        let breaks = stream
            .iter()
            .filter(|t| t.category == TokenCategory::LineBreak)
            .count();
        assert_eq!(breaks, 1);
    }

    #[test]
    fn test_folded_line_tokenizes_like_single_line() {
        let folded = tokenize("a + \\\n  b\n").unwrap();
        let single = tokenize("a +  b\n").unwrap();
        assert_eq!(folded, single);

        let folded = tokenize("若 x 和\\\n    真:\n").unwrap();
        let single = tokenize("若 x 和 真:\n").unwrap();
        assert_eq!(folded, single);
    }

    #[test]
    fn test_multiline_string_is_one_token() {
        let source = "文档 = '''第一行\n  若 第二行\n结束''' + x\ny\n";
        let mut analyzer = LexicalAnalyzer::new();
        let stream = analyzer.tokenize(source).unwrap();

        let literal = &stream.tokens()[4];
        assert_eq!(literal.category, TokenCategory::MultiLineString);
        assert_eq!(literal.text, "'''第一行\n  若 第二行\n结束'''");
        assert_eq!(stream.concat_text(), source);

        let metrics = analyzer.metrics();
        assert_eq!(metrics.multiline_strings, 1);
        assert_eq!(metrics.longest_multiline_span, 3);
        assert_eq!(metrics.logical_lines, 2);
        assert_eq!(metrics.physical_lines, 4);
    }

    #[test]
    fn test_scanning_resumes_on_closing_line() {
        let stream = tokenize("s = \"\"\"a\nb\"\"\"; t = '若'\n").unwrap();
        let significant: Vec<_> = stream.significant().map(|t| t.text.as_str()).collect();
        assert_eq!(significant, vec!["s", "=", "\"\"\"a\nb\"\"\"", ";", "t", "=", "'若'"]);
    }

    #[test]
    fn test_second_multiline_on_closing_line() {
        let source = "a = '''x\n''' + '''y\nz'''\n";
        let stream = tokenize(source).unwrap();
        let literals = stream
            .iter()
            .filter(|t| t.category == TokenCategory::MultiLineString)
            .count();
        assert_eq!(literals, 2);
        assert_eq!(stream.concat_text(), source);
    }

    #[test]
    fn test_closed_triple_quote_on_one_line() {
        let stream = tokenize("x = '''一行'''\n").unwrap();
        assert_eq!(stream.tokens()[4].text, "'''一行'''");
    }

    #[test]
    fn test_unterminated_multiline_string() {
        let err = tokenize("x = 1\ny = \"\"\"开始\n没有结束\n").unwrap_err();
        assert_matches!(err, LexerError::UnterminatedString { delimiter: "\"\"\"", position }
            if position.line == 2 && position.column == 5);
    }

    #[test]
    fn test_unterminated_continuation() {
        let err = tokenize("x = 1 + \\").unwrap_err();
        assert_matches!(err, LexerError::UnterminatedContinuation { position } if position.line == 1);
    }

    #[test]
    fn test_lexical_failure_reports_physical_line() {
        let err = tokenize("x = 1\ny = `z`\n").unwrap_err();
        assert_matches!(err, LexerError::LexicalFailure { position, .. }
            if position.line == 2 && position.column == 5);
        assert_eq!(err.error_code(), codes::lexical::LEXICAL_FAILURE);
    }

    #[test]
    fn test_unterminated_single_quote_fails() {
        let err = tokenize("print('未闭合)\n").unwrap_err();
        assert_matches!(err, LexerError::LexicalFailure { ref found, position }
            if found == "'''" && position.column == 7);
    }

    #[test]
    fn test_metrics_category_counts() {
        let mut analyzer = LexicalAnalyzer::new();
        analyzer.tokenize("x = 1 # c\n").unwrap();
        let metrics = analyzer.metrics();
        assert_eq!(metrics.total_tokens, 8);
        assert_eq!(metrics.category_counts.get(&TokenCategory::Space), Some(&3));
        assert_eq!(metrics.category_counts.get(&TokenCategory::Comment), Some(&1));
    }

    #[test]
    fn test_metrics_without_detail() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: false,
            log_multiline_strings: true,
            include_position_in_errors: false,
        };
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
        analyzer.tokenize("'''a\nb'''\n").unwrap();
        assert!(analyzer.metrics().category_counts.is_empty());
        assert_eq!(analyzer.metrics().total_tokens, 2);
    }
}
