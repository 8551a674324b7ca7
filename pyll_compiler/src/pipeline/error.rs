use crate::file_processor::FileProcessorError;
use crate::grammar::GrammarError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::syntax::SyntaxError;
use crate::tokens::TokenFormatError;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Grammar compilation failed: {0}")]
    GrammarCompilation(#[from] GrammarError),

    #[error("Token file is malformed: {0}")]
    TokenFormat(#[from] TokenFormatError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(e) => e.error_code(),
            Self::LexicalAnalysis(e) => e.error_code(),
            Self::GrammarCompilation(e) => e.error_code(),
            Self::TokenFormat(e) => e.error_code(),
            Self::SyntaxAnalysis(e) => e.error_code(),
            Self::Output { .. } => codes::file_processing::IO_ERROR,
            Self::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// The line printed for the user. Lexical and syntax failures use their fixed report
    /// formats; everything else is prefixed with `error:`.
    pub fn report(&self) -> String {
        match self {
            Self::LexicalAnalysis(e) => e.report(),
            Self::SyntaxAnalysis(e) => e.report(),
            other => format!("error: {}", other),
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::LexicalAnalysis(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_stage_errors_keep_their_codes_and_reports() {
        let lexical: PipelineError = LexerError::UnterminatedString {
            position: Position::at(2, 5),
        }
        .into();
        assert!(lexical.is_lexical());
        assert_eq!(lexical.error_code(), codes::lexical::UNTERMINATED_STRING);
        assert_eq!(lexical.report(), ">>> Lexical error (line: 2, column: 5)");

        let grammar: PipelineError = GrammarError::MissingInput {
            origin: "g.txt".to_string(),
        }
        .into();
        assert_eq!(grammar.error_code(), codes::grammar::MISSING_INPUT);
        assert!(grammar.report().starts_with("error: Grammar compilation failed"));
    }

    #[test]
    fn test_pipeline_error_message() {
        let error = PipelineError::pipeline_error("nothing to do");
        assert_eq!(error.to_string(), "Pipeline error: nothing to do");
        assert_eq!(error.error_code(), codes::system::INTERNAL_ERROR);
    }
}
