//! Table-driven LL(1) parser
//!
//! The stack starts as `[$, start]`. Each step pops one symbol: `ε` is dropped, a terminal
//! must match the current token (by kind, or by lexeme), a non-terminal is replaced by the
//! production the table selects for the current token. Parsing stops at the first error.

use super::error::{SyntaxError, SyntaxResult};
use crate::config::compile_time::syntax::*;
use crate::config::runtime::ParserPreferences;
use crate::grammar::{CompiledGrammar, SymbolKind};
use crate::logging::codes;
use crate::tokens::token::END_MARKER;
use crate::tokens::TokenStream;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;

/// Counters for a successful parse
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseSummary {
    pub steps: usize,
    pub expansions: usize,
    pub matched_tokens: usize,
    pub max_stack_depth: usize,
}

pub struct LL1Parser<'g> {
    grammar: &'g CompiledGrammar,
    preferences: ParserPreferences,
}

impl<'g> LL1Parser<'g> {
    pub fn new(grammar: &'g CompiledGrammar) -> Self {
        Self {
            grammar,
            preferences: ParserPreferences::default(),
        }
    }

    pub fn with_preferences(grammar: &'g CompiledGrammar, preferences: ParserPreferences) -> Self {
        Self {
            grammar,
            preferences,
        }
    }

    /// Parse a token stream against the grammar
    pub fn parse(&self, mut stream: TokenStream) -> SyntaxResult<ParseSummary> {
        let start = self.grammar.start_symbol();

        log_debug!("Starting syntax analysis",
            "tokens" => stream.len(),
            "start_symbol" => start,
            "synthesized_end" => stream.has_synthesized_end()
        );

        let mut stack: Vec<String> = vec![END_MARKER.to_string(), start.to_string()];
        let mut rule = start.to_string();
        let mut summary = ParseSummary {
            max_stack_depth: stack.len(),
            ..Default::default()
        };

        while let Some(top) = stack.pop() {
            summary.steps += 1;

            let current = stream.current();
            let kind = current.value.kind_name().to_string();
            let lexeme = current.value.lexeme().map(str::to_string);
            let found = current.value.display_text().to_string();
            let position = current.span.start;

            if summary.steps > MAX_PARSE_STEPS {
                return Err(self.fail(SyntaxError::StepLimit { rule, position }));
            }

            if self.preferences.trace_steps {
                log_debug!("Parser step",
                    "step" => summary.steps,
                    "top" => &top,
                    "token" => &found,
                    "stack_depth" => stack.len() + 1
                );
            }

            match self.grammar.grammar.classify(&top) {
                SymbolKind::Epsilon => continue,

                SymbolKind::Terminal => {
                    if top == kind || lexeme.as_deref() == Some(top.as_str()) {
                        stream.advance();
                        summary.matched_tokens += 1;
                    } else {
                        return Err(self.fail(SyntaxError::TerminalMismatch {
                            rule,
                            expected: top,
                            found,
                            position,
                        }));
                    }
                }

                SymbolKind::NonTerminal => {
                    rule = top.clone();

                    match self.grammar.table.lookup(&top, &kind, lexeme.as_deref()) {
                        Some(production) => {
                            if stack.len() + production.len() > MAX_STACK_DEPTH {
                                return Err(self.fail(SyntaxError::StackOverflow { rule, position }));
                            }
                            stack.extend(production.symbols().iter().rev().cloned());
                            summary.expansions += 1;
                            summary.max_stack_depth = summary.max_stack_depth.max(stack.len());
                        }
                        None => {
                            return Err(self.fail(SyntaxError::NoTableEntry {
                                expected: self.grammar.table.expected_terminals(&top),
                                rule,
                                found,
                                position,
                            }));
                        }
                    }
                }

                SymbolKind::Unrecognized => {
                    return Err(self.fail(SyntaxError::UnknownSymbol {
                        rule,
                        symbol: top,
                        found,
                        position,
                    }));
                }
            }
        }

        log_success!(codes::success::PARSE_COMPLETE, "Syntax analysis completed successfully",
            "steps" => summary.steps,
            "expansions" => summary.expansions,
            "matched_tokens" => summary.matched_tokens,
            "max_stack_depth" => summary.max_stack_depth
        );

        Ok(summary)
    }

    fn fail(&self, error: SyntaxError) -> SyntaxError {
        log_error!(error.error_code(), "Syntax analysis failed",
            span = error.span(),
            "rule" => error.rule(),
            "found" => error.found().unwrap_or("-"),
            "expected" => error.expected().join(", ")
        );
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::compile_str;
    use crate::lexical::tokenize;
    use crate::tokens::{read_tokens, Token, TokenKind, TokenStreamBuilder};
    use assert_matches::assert_matches;

    const EXPRESSIONS: &str = "E -> T Ep\nEp -> + T Ep | ε\nT -> num\n";

    fn stream(kinds: &[&str]) -> TokenStream {
        kinds
            .iter()
            .fold(TokenStreamBuilder::new(), |builder, kind| {
                builder
                    .push_token(Token::new(TokenKind::from_name(kind)), kind)
                    .skip(" ")
            })
            .build()
    }

    #[test]
    fn test_accepts_sentence() {
        let grammar = compile_str(EXPRESSIONS).unwrap();
        let summary = LL1Parser::new(&grammar)
            .parse(stream(&["num", "+", "num", "$"]))
            .unwrap();
        assert_eq!(summary.matched_tokens, 4);
    }

    #[test]
    fn test_missing_operand_reports_once() {
        let grammar = compile_str(EXPRESSIONS).unwrap();
        let error = LL1Parser::new(&grammar)
            .parse(stream(&["num", "+", "$"]))
            .unwrap_err();

        assert_matches!(error, SyntaxError::NoTableEntry { ref rule, ref found, .. }
            if rule == "T" && found == "$");
        assert!(error.expected().contains(&"num".to_string()));
    }

    #[test]
    fn test_end_marker_is_synthesized() {
        let grammar = compile_str(EXPRESSIONS).unwrap();
        assert!(LL1Parser::new(&grammar).parse(stream(&["num"])).is_ok());
    }

    #[test]
    fn test_trailing_input_is_rejected() {
        let grammar = compile_str(EXPRESSIONS).unwrap();
        let error = LL1Parser::new(&grammar)
            .parse(stream(&["num", "num"]))
            .unwrap_err();
        assert_matches!(error, SyntaxError::NoTableEntry { ref rule, .. } if rule == "Ep");
        assert_eq!(error.expected(), vec!["$", "+"]);
    }

    #[test]
    fn test_terminal_mismatch_position() {
        let grammar = compile_str("S -> ( id )\n").unwrap();
        let tokens = read_tokens("<(,1,1>\n<id,x,1,2>\n<id,y,1,4>\n").unwrap();
        let error = LL1Parser::new(&grammar)
            .parse(TokenStream::new(tokens))
            .unwrap_err();

        assert_eq!(
            error.report(),
            "<1,4> Syntax error in rule 'S': found \"y\"; expected: \")\"."
        );
    }

    #[test]
    fn test_lexeme_fallback_for_terminals_and_table() {
        // `print` is an identifier to the lexer but a terminal in this grammar
        let grammar = compile_str("S -> print id tk_newline\n").unwrap();
        let tokens = tokenize("print x\n").unwrap();
        assert!(LL1Parser::new(&grammar).parse(TokenStream::new(tokens)).is_ok());
    }

    #[test]
    fn test_undefined_symbol_stops_parse() {
        let grammar = compile_str("S -> a MISSING\n").unwrap();
        let error = LL1Parser::new(&grammar)
            .parse(stream(&["a", "b"]))
            .unwrap_err();
        assert_matches!(error, SyntaxError::UnknownSymbol { ref symbol, ref found, .. }
            if symbol == "MISSING" && found == "b");
    }

    #[test]
    fn test_parses_lexer_output() {
        let grammar = compile_str(
            "\
PROGRAM -> STMT PROGRAM | ε
STMT    -> id tk_assign EXPR tk_newline
         | if EXPR tk_colon tk_newline tk_indent PROGRAM tk_dedent
EXPR    -> id | tk_integer
",
        )
        .unwrap();

        let tokens = tokenize("x = 1\nif x:\n    y = x\nz = 2\n").unwrap();
        let summary = LL1Parser::new(&grammar)
            .parse(TokenStream::new(tokens))
            .unwrap();
        assert!(summary.expansions > 0);

        let tokens = tokenize("x = 1\nif x:\ny = 2\n").unwrap();
        let error = LL1Parser::new(&grammar)
            .parse(TokenStream::new(tokens))
            .unwrap_err();
        assert_matches!(error, SyntaxError::TerminalMismatch { ref expected, .. }
            if expected == "tk_indent");
        assert_eq!(error.position().line, 3);
    }
}
