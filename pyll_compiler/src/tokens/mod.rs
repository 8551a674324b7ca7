//! Token model shared by the lexer, the token file format and the parser
//!
//! # Overview
//!
//! Tokens are identified by a kind name and optionally carry a lexeme. The same names are
//! used in three places: the lexer output, the `<KIND,...>` interchange lines, and the
//! terminals of an LL(1) grammar. A grammar that wants to match an identifier writes `id`;
//! one that wants to match `while` writes `while`.
//!
//! ## Kinds
//!
//! - **Layout**: `tk_newline`, `tk_indent`, `tk_dedent`
//! - **Literals**: `tk_integer`, `tk_string` (lexeme = digits / unquoted content)
//! - **Identifiers**: `id` (lexeme = name)
//! - **Reserved words**: the word itself, no lexeme
//! - **Operators and delimiters**: `tk_` names such as `tk_plus`, `tk_floordiv_assign`,
//!   `tk_lparen`
//! - **End-marker**: `$`
//!
//! ## Components
//!
//! - [`Token`] / [`TokenKind`] - the token value and its kind
//! - [`TokenStream`] - parser cursor that guarantees a trailing end-marker
//! - [`interchange`] - reading and writing token files

pub mod interchange;
pub mod token;
pub mod token_stream;

pub use interchange::{format_token, read_tokens, render_tokens, write_tokens, TokenFormatError};
pub use token::{Token, TokenClass, TokenKind};
pub use token_stream::{SpannedToken, TokenStream, TokenStreamBuilder};

pub use token::{
    classify_delimiter, classify_operator_symbol, classify_word, is_delimiter, is_operator_char,
    is_reserved_word, match_operator,
};

pub use crate::utils::{Position, Span, Spanned};
