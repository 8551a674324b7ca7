use crate::file_processor::FileMetadata;
use crate::grammar::GrammarStats;
use crate::lexical::LexicalMetrics;
use crate::syntax::ParseSummary;
use std::time::Duration;

/// Wall-clock time spent in each stage
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub lexical: Duration,
    pub grammar: Duration,
    pub syntax: Duration,
    pub total: Duration,
}

/// Result of a successful lex-then-parse run
#[derive(Debug)]
pub struct PipelineResult {
    pub source_metadata: FileMetadata,
    pub grammar_metadata: FileMetadata,
    pub lexical_metrics: LexicalMetrics,
    pub grammar_stats: GrammarStats,
    pub parse_summary: ParseSummary,
    pub token_count: usize,
    pub timings: StageTimings,
}

impl PipelineResult {
    pub fn new(
        source_metadata: FileMetadata,
        grammar_metadata: FileMetadata,
        lexical_metrics: LexicalMetrics,
        grammar_stats: GrammarStats,
        parse_summary: ParseSummary,
        token_count: usize,
        timings: StageTimings,
    ) -> Self {
        Self {
            source_metadata,
            grammar_metadata,
            lexical_metrics,
            grammar_stats,
            parse_summary,
            token_count,
            timings,
        }
    }

    pub fn log_success(&self, file_path: &str) {
        let seconds = self.timings.total.as_secs_f64().max(f64::EPSILON);

        crate::log_success!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "Lexical and syntax analysis succeeded",
            "file" => file_path,
            "tokens" => self.token_count,
            "parse_steps" => self.parse_summary.steps,
            "lexical_ms" => format!("{:.2}", self.timings.lexical.as_secs_f64() * 1000.0),
            "grammar_ms" => format!("{:.2}", self.timings.grammar.as_secs_f64() * 1000.0),
            "syntax_ms" => format!("{:.2}", self.timings.syntax.as_secs_f64() * 1000.0),
            "duration_ms" => format!("{:.2}", self.timings.total.as_secs_f64() * 1000.0),
            "processing_rate_tokens_per_sec" => format!("{:.0}", self.token_count as f64 / seconds)
        );
    }
}
