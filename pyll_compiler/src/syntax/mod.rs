//! Syntax analysis: drives a token stream through a compiled LL(1) table
//!
//! No tree is built. A parse either consumes the whole stream, end-marker included, or
//! stops at the first error with the rule, the offending token and the expected set.

mod error;
mod parser;

pub use error::{SyntaxError, SyntaxResult};
pub use parser::{LL1Parser, ParseSummary};

use crate::config::runtime::ParserPreferences;
use crate::grammar::CompiledGrammar;
use crate::logging::codes;
use crate::tokens::{SpannedToken, TokenStream};

/// Parse a token sequence. A missing end-marker is appended.
pub fn parse_tokens(
    grammar: &CompiledGrammar,
    tokens: Vec<SpannedToken>,
    preferences: ParserPreferences,
) -> SyntaxResult<ParseSummary> {
    LL1Parser::with_preferences(grammar, preferences).parse(TokenStream::new(tokens))
}

pub fn create_parser(grammar: &CompiledGrammar) -> LL1Parser<'_> {
    LL1Parser::new(grammar)
}

/// Check that every syntax error code is registered
pub fn init_syntax_logging() -> Result<(), String> {
    let syntax_codes = [
        codes::syntax::TERMINAL_MISMATCH,
        codes::syntax::NO_TABLE_ENTRY,
        codes::syntax::UNKNOWN_STACK_SYMBOL,
        codes::syntax::STACK_DEPTH_EXCEEDED,
        codes::syntax::STEP_LIMIT_EXCEEDED,
    ];

    for code in &syntax_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::compile_str;
    use crate::tokens::read_tokens;

    #[test]
    fn test_init_logging() {
        assert!(init_syntax_logging().is_ok());
    }

    #[test]
    fn test_parse_token_file_lines() {
        let grammar = compile_str("E -> T Ep\nEp -> + T Ep | ε\nT -> num\n").unwrap();
        let tokens = read_tokens("<num,1,1>\n<+,1,5>\n<num,1,7>\n").unwrap();

        let summary = parse_tokens(&grammar, tokens, ParserPreferences::default()).unwrap();
        assert_eq!(summary.matched_tokens, 4);
    }

    #[test]
    fn test_empty_token_file() {
        let grammar = compile_str("S -> a | ε\n").unwrap();
        let tokens = read_tokens("").unwrap();
        assert!(parse_tokens(&grammar, tokens, ParserPreferences::default()).is_ok());

        let strict = compile_str("S -> a\n").unwrap();
        let error = create_parser(&strict)
            .parse(TokenStream::new(read_tokens("").unwrap()))
            .unwrap_err();
        assert_eq!(
            error.report(),
            "<0,0> Syntax error in rule 'S': found \"$\"; expected: \"a\"."
        );
    }
}
