//! Lexical analyzer: runs the scanner with logging, metrics and runtime preferences
//!
//! The scanner itself is in `lexer`; this layer adds file context, metric collection
//! and the structured log events emitted for every run.

use super::error::LexerError;
use super::lexer::{LexOutput, Lexer};
use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::tokens::{SpannedToken, TokenClass, TokenKind};
use crate::{log_debug, log_error, log_success};
use serde::Serialize;
use std::collections::BTreeMap;

/// Token metrics for one run
#[derive(Debug, Default, Clone, Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub operator_tokens: usize,
    pub delimiter_tokens: usize,
    pub literal_tokens: usize,
    pub layout_tokens: usize,
    pub indent_tokens: usize,
    pub dedent_tokens: usize,
    pub max_indent_depth: usize,
    pub max_string_length: usize,
    pub line_count: u32,

    // Only filled when detailed metrics are enabled
    pub kind_counts: BTreeMap<String, usize>,
}

impl LexicalMetrics {
    /// Compute metrics over a token sequence
    pub fn from_tokens(tokens: &[SpannedToken], preferences: &LexicalPreferences) -> Self {
        let mut metrics = Self::default();
        let mut depth = 0usize;

        for token in tokens {
            metrics.total_tokens += 1;

            match token.value.token_class() {
                TokenClass::Keyword => metrics.keyword_tokens += 1,
                TokenClass::Identifier => metrics.identifier_tokens += 1,
                TokenClass::Operator => metrics.operator_tokens += 1,
                TokenClass::Delimiter => metrics.delimiter_tokens += 1,
                TokenClass::Literal => metrics.literal_tokens += 1,
                TokenClass::Layout => metrics.layout_tokens += 1,
                TokenClass::EndMarker | TokenClass::Unknown => {}
            }

            match token.value.kind {
                TokenKind::Indent => {
                    metrics.indent_tokens += 1;
                    depth += 1;
                    metrics.max_indent_depth = metrics.max_indent_depth.max(depth);
                }
                TokenKind::Dedent => {
                    metrics.dedent_tokens += 1;
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Str => {
                    let length = token.value.lexeme().map(str::len).unwrap_or(0);
                    metrics.max_string_length = metrics.max_string_length.max(length);
                }
                _ => {}
            }

            metrics.line_count = metrics.line_count.max(token.span.end.line);

            if preferences.collect_detailed_metrics {
                *metrics
                    .kind_counts
                    .entry(token.value.kind_name().to_string())
                    .or_insert(0) += 1;
            }
        }

        metrics
    }

    /// Whether every INDENT was matched by a DEDENT
    pub fn is_balanced(&self) -> bool {
        self.indent_tokens == self.dedent_tokens
    }
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Tokenize a loaded source file
    pub fn tokenize_file_result(&mut self, file_result: &FileProcessingResult) -> LexOutput {
        let origin = file_result.metadata.path.display().to_string();

        log_debug!("Starting lexical analysis",
            "file" => origin.as_str(),
            "char_count" => file_result.char_count(),
            "line_count" => file_result.metadata.line_count,
            "file_size_bytes" => file_result.metadata.size,
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        self.tokenize_source(&file_result.source, &origin)
    }

    /// Tokenize source text. `origin` names the source in log events.
    pub fn tokenize_source(&mut self, source: &str, origin: &str) -> LexOutput {
        let start_time = std::time::Instant::now();

        let output = Lexer::new(source).run();
        self.metrics = LexicalMetrics::from_tokens(&output.tokens, &self.preferences);

        if self.preferences.log_indentation_changes {
            self.log_indentation(&output.tokens);
        }

        match &output.error {
            Some(error) => self.log_failure(error, origin),
            None => {
                log_success!(codes::success::TOKENIZATION_COMPLETE,
                    "Lexical analysis completed successfully",
                    "file" => origin,
                    "token_count" => self.metrics.total_tokens,
                    "keywords" => self.metrics.keyword_tokens,
                    "identifiers" => self.metrics.identifier_tokens,
                    "operators" => self.metrics.operator_tokens,
                    "literals" => self.metrics.literal_tokens,
                    "max_indent_depth" => self.metrics.max_indent_depth,
                    "max_string_length" => self.metrics.max_string_length,
                    "duration_ms" => format!("{:.3}", start_time.elapsed().as_secs_f64() * 1000.0)
                );
            }
        }

        output
    }

    fn log_failure(&self, error: &LexerError, origin: &str) {
        let message = if self.preferences.include_position_in_errors {
            format!(
                "Lexical analysis failed at line {}, column {}: {}",
                error.line(),
                error.column(),
                error
            )
        } else {
            format!("Lexical analysis failed: {}", error)
        };

        log_error!(error.error_code(), &message,
            span = error.span(),
            "file" => origin,
            "line" => error.line(),
            "column" => error.column(),
            "tokens_processed" => self.metrics.total_tokens
        );
    }

    fn log_indentation(&self, tokens: &[SpannedToken]) {
        for token in tokens {
            match token.value.kind {
                TokenKind::Indent | TokenKind::Dedent => {
                    log_debug!("Indentation change",
                        "kind" => token.value.kind_name(),
                        "line" => token.span.start.line,
                        "column" => token.span.start.column
                    );
                }
                _ => {}
            }
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_metrics_for_block() {
        let mut analyzer = LexicalAnalyzer::new();
        let output = analyzer.tokenize_source("if x:\n    y = 'abc'\n", "inline");
        assert!(output.is_ok());

        let metrics = analyzer.metrics();
        assert_eq!(metrics.total_tokens, output.tokens.len());
        assert_eq!(metrics.keyword_tokens, 1);
        assert_eq!(metrics.identifier_tokens, 2);
        assert_eq!(metrics.operator_tokens, 1);
        assert_eq!(metrics.delimiter_tokens, 1);
        assert_eq!(metrics.literal_tokens, 1);
        assert_eq!(metrics.max_indent_depth, 1);
        assert_eq!(metrics.max_string_length, 3);
        assert!(metrics.is_balanced());
    }

    #[test]
    fn test_detailed_metrics_follow_preferences() {
        let mut analyzer = LexicalAnalyzer::with_preferences(LexicalPreferences {
            collect_detailed_metrics: true,
            ..Default::default()
        });
        analyzer.tokenize_source("a = b\n", "inline");
        assert_eq!(analyzer.metrics().kind_counts.get("id"), Some(&2));

        analyzer.set_preferences(LexicalPreferences {
            collect_detailed_metrics: false,
            ..Default::default()
        });
        analyzer.tokenize_source("a = b\n", "inline");
        assert!(analyzer.metrics().kind_counts.is_empty());
    }

    #[test]
    fn test_failure_keeps_partial_tokens() {
        let mut analyzer = LexicalAnalyzer::new();
        let output = analyzer.tokenize_source("x = 1 ? 2\n", "inline");
        assert_eq!(output.tokens.len(), 3);
        assert_matches!(
            output.error,
            Some(LexerError::InvalidCharacter { character: '?', .. })
        );
        assert_eq!(analyzer.metrics().total_tokens, 3);
    }
}
