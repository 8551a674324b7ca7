//! Shared source-location primitives used by the lexer, the token interchange
//! reader and the parser diagnostics.

pub mod span;

pub use span::{Position, Span, Spanned};
