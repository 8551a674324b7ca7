//! Grammar compilation errors

use crate::config::compile_time::grammar::*;
use crate::logging::{codes, Code};

pub type GrammarResult<T> = Result<T, GrammarError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("Grammar source '{origin}' contains no rules")]
    MissingInput { origin: String },

    #[error("Line {line}: alternatives '{content}' appear before any rule header")]
    RuleBeforeHeader { line: usize, content: String },

    #[error("Line {line}: malformed rule header '{content}'")]
    MalformedHeader { line: usize, content: String },

    #[error("Grammar is not LL(1): conflict in M[{non_terminal}, {terminal}] between '{existing}' and '{conflicting}'")]
    Ll1Conflict {
        non_terminal: String,
        terminal: String,
        existing: String,
        conflicting: String,
    },

    #[error("Grammar has {count} productions (max {})", MAX_RULES)]
    TooManyRules { count: usize },

    #[error("Line {line}: production has {count} symbols (max {})", MAX_SYMBOLS_PER_PRODUCTION)]
    ProductionTooLong { line: usize, count: usize },

    #[error("{set} sets did not converge after {iterations} passes")]
    NotConverged { set: &'static str, iterations: usize },
}

impl GrammarError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::MissingInput { .. } => codes::grammar::MISSING_INPUT,
            Self::RuleBeforeHeader { .. } => codes::grammar::RULE_BEFORE_HEADER,
            Self::MalformedHeader { .. } => codes::grammar::MALFORMED_HEADER,
            Self::Ll1Conflict { .. } => codes::grammar::LL1_CONFLICT,
            Self::TooManyRules { .. } | Self::ProductionTooLong { .. } => {
                codes::grammar::GRAMMAR_TOO_LARGE
            }
            Self::NotConverged { .. } => codes::grammar::SETS_DID_NOT_CONVERGE,
        }
    }

    /// Grammar source line, for errors raised while reading
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::RuleBeforeHeader { line, .. }
            | Self::MalformedHeader { line, .. }
            | Self::ProductionTooLong { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput { .. } | Self::RuleBeforeHeader { .. } | Self::MalformedHeader { .. }
        )
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }
}
