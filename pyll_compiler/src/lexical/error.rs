//! Lexical errors. Every variant carries the position scanning stopped at.

use crate::config::compile_time::lexical::*;
use crate::logging::codes;
use crate::utils::{Position, Span};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at {position}")]
    InvalidCharacter { character: char, position: Position },

    #[error("Unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },

    #[error("Unterminated block comment starting at {position}")]
    UnterminatedBlockComment { position: Position },

    #[error("Integer '{digits}' followed by '{suffix}' at {position}")]
    MalformedInteger {
        digits: String,
        suffix: char,
        position: Position,
    },

    #[error("Indentation mixes tabs and spaces at {position}")]
    MixedIndentation { position: Position },

    #[error("Dedent to width {width} does not match any outer indentation level at {position}")]
    IndentationMismatch { width: usize, position: Position },

    #[error("Indentation nested {depth} levels deep (max {}) at {position}", MAX_INDENT_DEPTH)]
    IndentationTooDeep { depth: usize, position: Position },

    #[error("Too many tokens: {count} (max {})", MAX_TOKEN_COUNT)]
    TooManyTokens { count: usize, position: Position },

    #[error("String too large: {size} bytes (max {}) at {position}", MAX_STRING_SIZE)]
    StringTooLarge { size: usize, position: Position },

    #[error("Identifier too long: {length} characters (max {}) at {position}", MAX_IDENTIFIER_LENGTH)]
    IdentifierTooLong { length: usize, position: Position },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnterminatedBlockComment { .. } => {
                codes::lexical::UNTERMINATED_BLOCK_COMMENT
            }
            LexerError::MalformedInteger { .. } => codes::lexical::MALFORMED_INTEGER,
            LexerError::MixedIndentation { .. } => codes::lexical::MIXED_INDENTATION,
            LexerError::IndentationMismatch { .. } => codes::lexical::INDENTATION_MISMATCH,
            LexerError::IndentationTooDeep { .. } => codes::lexical::INDENTATION_TOO_DEEP,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            LexerError::InvalidCharacter { position, .. }
            | LexerError::UnterminatedString { position }
            | LexerError::UnterminatedBlockComment { position }
            | LexerError::MalformedInteger { position, .. }
            | LexerError::MixedIndentation { position }
            | LexerError::IndentationMismatch { position, .. }
            | LexerError::IndentationTooDeep { position, .. }
            | LexerError::TooManyTokens { position, .. }
            | LexerError::StringTooLarge { position, .. }
            | LexerError::IdentifierTooLong { position, .. } => *position,
        }
    }

    pub fn span(&self) -> Span {
        Span::single(self.position())
    }

    pub fn line(&self) -> u32 {
        self.position().line
    }

    pub fn column(&self) -> u32 {
        self.position().column
    }

    /// The one-line report written after the partial token list
    pub fn report(&self) -> String {
        format!(
            ">>> Lexical error (line: {}, column: {})",
            self.line(),
            self.column()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_line() {
        let error = LexerError::UnterminatedString {
            position: Position::new(10, 3, 7),
        };
        assert_eq!(error.report(), ">>> Lexical error (line: 3, column: 7)");
        assert_eq!(error.error_code(), codes::lexical::UNTERMINATED_STRING);
    }

    #[test]
    fn test_span_starts_at_position() {
        let position = Position::new(4, 1, 5);
        let error = LexerError::InvalidCharacter {
            character: '?',
            position,
        };
        assert_eq!(error.span().start(), position);
        assert!(error.to_string().contains("'?'"));
    }
}
