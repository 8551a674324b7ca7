//! Lexical analysis for the indentation-sensitive source language
//!
//! Turns source text into the token sequence consumed by the parser. Layout is made
//! explicit: every logical line ends in `tk_newline`, and indentation changes produce
//! `tk_indent` / `tk_dedent` tokens. Scanning stops at the first error; the tokens
//! produced before it are returned alongside the error.

pub mod analyzer;
pub mod error;
pub mod indentation;
pub mod lexer;

use crate::config::compile_time::lexical::*;
use crate::logging::codes;

pub use analyzer::{LexicalAnalyzer, LexicalMetrics};
pub use error::LexerError;
pub use indentation::{measure_indentation, IndentChange, IndentStack, TAB_STOP};
pub use lexer::{tokenize, tokenize_partial, LexOutput, Lexer};

/// Check that every lexical error code is registered
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    use codes::lexical::*;

    let missing = [
        INVALID_CHARACTER,
        UNTERMINATED_STRING,
        MALFORMED_INTEGER,
        UNTERMINATED_BLOCK_COMMENT,
        MIXED_INDENTATION,
        INDENTATION_MISMATCH,
        INDENTATION_TOO_DEEP,
        TOO_MANY_TOKENS,
        STRING_TOO_LARGE,
        IDENTIFIER_TOO_LONG,
    ]
    .into_iter()
    .find(|code| codes::get_error_metadata(code.as_str()).is_none());

    if let Some(code) = missing {
        return Err(format!("Lexical error code {} is not registered", code));
    }

    crate::log_debug!("Lexical limits",
        "max_token_count" => MAX_TOKEN_COUNT,
        "max_indent_depth" => MAX_INDENT_DEPTH,
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH
    );

    Ok(())
}
