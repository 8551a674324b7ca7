//! JSON-serializable summary of a pipeline run

use super::{PipelineError, PipelineResult};
use crate::grammar::GrammarStats;
use crate::lexical::LexicalMetrics;
use crate::syntax::ParseSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TimingsOutput {
    pub lexical_ms: f64,
    pub grammar_ms: f64,
    pub syntax_ms: f64,
    pub total_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub code: String,
    pub category: String,
    pub message: String,
    pub report: String,
}

impl From<&PipelineError> for ErrorOutput {
    fn from(error: &PipelineError) -> Self {
        let code = error.error_code();
        Self {
            code: code.as_str().to_string(),
            category: crate::logging::codes::get_category(code.as_str()).to_string(),
            message: error.to_string(),
            report: error.report(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PipelineOutput {
    pub source: String,
    pub grammar: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical: Option<LexicalMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar_stats: Option<GrammarStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse: Option<ParseSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<TimingsOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOutput>,
}

impl PipelineOutput {
    pub fn from_result(source: &str, grammar: &str, result: &PipelineResult) -> Self {
        let ms = |d: std::time::Duration| d.as_secs_f64() * 1000.0;
        Self {
            source: source.to_string(),
            grammar: grammar.to_string(),
            success: true,
            token_count: Some(result.token_count),
            lexical: Some(result.lexical_metrics.clone()),
            grammar_stats: Some(result.grammar_stats.clone()),
            parse: Some(result.parse_summary.clone()),
            timings: Some(TimingsOutput {
                lexical_ms: ms(result.timings.lexical),
                grammar_ms: ms(result.timings.grammar),
                syntax_ms: ms(result.timings.syntax),
                total_ms: ms(result.timings.total),
            }),
            error: None,
        }
    }

    pub fn from_error(source: &str, grammar: &str, error: &PipelineError) -> Self {
        Self {
            source: source.to_string(),
            grammar: grammar.to_string(),
            success: false,
            token_count: None,
            lexical: None,
            grammar_stats: None,
            parse: None,
            timings: None,
            error: Some(ErrorOutput::from(error)),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_error_output_json() {
        let error = PipelineError::from(crate::lexical::LexerError::InvalidCharacter {
            character: '?',
            position: Position::at(1, 7),
        });
        let output = PipelineOutput::from_error("a.py", "g.txt", &error);
        let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "E020");
        assert_eq!(json["error"]["report"], ">>> Lexical error (line: 1, column: 7)");
        assert!(json.get("parse").is_none());
    }
}
