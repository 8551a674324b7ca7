//! Syntax errors raised by the table-driven parser
//!
//! Each variant records the rule being expanded when parsing stopped and the position of
//! the current token.

use crate::config::compile_time::syntax::*;
use crate::logging::{codes, Code};
use crate::utils::{Position, Span};

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Expected '{expected}' but found '{found}' in rule '{rule}' at {position}")]
    TerminalMismatch {
        rule: String,
        expected: String,
        found: String,
        position: Position,
    },

    #[error("No production of '{rule}' starts with '{found}' at {position}")]
    NoTableEntry {
        rule: String,
        expected: Vec<String>,
        found: String,
        position: Position,
    },

    #[error("Symbol '{symbol}' is neither a terminal nor a non-terminal (rule '{rule}') at {position}")]
    UnknownSymbol {
        rule: String,
        symbol: String,
        found: String,
        position: Position,
    },

    #[error("Parser stack exceeded {} symbols in rule '{rule}' at {position}", MAX_STACK_DEPTH)]
    StackOverflow { rule: String, position: Position },

    #[error("Parse exceeded {} steps in rule '{rule}' at {position}", MAX_PARSE_STEPS)]
    StepLimit { rule: String, position: Position },
}

impl SyntaxError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::TerminalMismatch { .. } => codes::syntax::TERMINAL_MISMATCH,
            Self::NoTableEntry { .. } => codes::syntax::NO_TABLE_ENTRY,
            Self::UnknownSymbol { .. } => codes::syntax::UNKNOWN_STACK_SYMBOL,
            Self::StackOverflow { .. } => codes::syntax::STACK_DEPTH_EXCEEDED,
            Self::StepLimit { .. } => codes::syntax::STEP_LIMIT_EXCEEDED,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::TerminalMismatch { position, .. }
            | Self::NoTableEntry { position, .. }
            | Self::UnknownSymbol { position, .. }
            | Self::StackOverflow { position, .. }
            | Self::StepLimit { position, .. } => *position,
        }
    }

    pub fn span(&self) -> Span {
        Span::empty(self.position())
    }

    pub fn rule(&self) -> &str {
        match self {
            Self::TerminalMismatch { rule, .. }
            | Self::NoTableEntry { rule, .. }
            | Self::UnknownSymbol { rule, .. }
            | Self::StackOverflow { rule, .. }
            | Self::StepLimit { rule, .. } => rule,
        }
    }

    /// Symbols that would have been accepted
    pub fn expected(&self) -> Vec<String> {
        match self {
            Self::TerminalMismatch { expected, .. } => vec![expected.clone()],
            Self::NoTableEntry { expected, .. } => expected.clone(),
            Self::UnknownSymbol { symbol, .. } => vec![symbol.clone()],
            Self::StackOverflow { .. } | Self::StepLimit { .. } => Vec::new(),
        }
    }

    /// Text of the token parsing stopped at
    pub fn found(&self) -> Option<&str> {
        match self {
            Self::TerminalMismatch { found, .. }
            | Self::NoTableEntry { found, .. }
            | Self::UnknownSymbol { found, .. } => Some(found.as_str()),
            Self::StackOverflow { .. } | Self::StepLimit { .. } => None,
        }
    }

    pub fn is_resource_limit(&self) -> bool {
        matches!(self, Self::StackOverflow { .. } | Self::StepLimit { .. })
    }

    /// The one-line report:
    /// `<L,C> Syntax error in rule 'R': found "x"; expected: "a", "b".`
    pub fn report(&self) -> String {
        let position = self.position();
        let prefix = format!(
            "<{},{}> Syntax error in rule '{}'",
            position.line,
            position.column,
            self.rule()
        );

        match self.found() {
            Some(found) => {
                let expected: Vec<String> =
                    self.expected().iter().map(|e| format!("\"{}\"", e)).collect();
                format!(
                    "{}: found \"{}\"; expected: {}.",
                    prefix,
                    found,
                    expected.join(", ")
                )
            }
            None => format!("{}: {}.", prefix, self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lists_expected_terminals() {
        let error = SyntaxError::NoTableEntry {
            rule: "T".to_string(),
            expected: vec!["(".to_string(), "num".to_string()],
            found: "$".to_string(),
            position: Position::at(3, 7),
        };
        assert_eq!(
            error.report(),
            "<3,7> Syntax error in rule 'T': found \"$\"; expected: \"(\", \"num\"."
        );
        assert_eq!(error.error_code(), codes::syntax::NO_TABLE_ENTRY);
    }

    #[test]
    fn test_mismatch_expects_single_terminal() {
        let error = SyntaxError::TerminalMismatch {
            rule: "F".to_string(),
            expected: ")".to_string(),
            found: "tk_newline".to_string(),
            position: Position::at(1, 9),
        };
        assert_eq!(error.expected(), vec![")"]);
        assert!(error.report().ends_with("found \"tk_newline\"; expected: \")\"."));
    }

    #[test]
    fn test_limit_errors_have_no_expected_set() {
        let error = SyntaxError::StackOverflow {
            rule: "S".to_string(),
            position: Position::at(1, 1),
        };
        assert!(error.is_resource_limit());
        assert!(error.expected().is_empty());
        assert!(error.report().starts_with("<1,1> Syntax error in rule 'S': Parser stack"));
    }
}
