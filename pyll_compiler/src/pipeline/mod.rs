//! Driver that chains the stages: source file -> tokens -> token file -> parse
//!
//! A lexical error ends the run before the grammar is even read. When a token file path is
//! given, the tokens are written there first (followed by the lexical error line, if any)
//! and the parser reads them back from that file.

mod error;
pub mod output;
mod result;
mod validation;

pub use error::PipelineError;
pub use output::PipelineOutput;
pub use result::{PipelineResult, StageTimings};
pub use validation::validate_pipeline;

use crate::config::runtime::RuntimeConfig;
use crate::file_processor::{FileMetadata, FileProcessingResult, FileProcessor};
use crate::grammar::CompiledGrammar;
use crate::lexical::{LexOutput, LexicalAnalyzer, LexicalMetrics};
use crate::logging::{self, codes};
use crate::syntax::ParseSummary;
use crate::tokens::{read_tokens, write_tokens, SpannedToken};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A lexed source file. `output.error` is set when scanning stopped early; `output.tokens`
/// then holds everything recognized before the error.
#[derive(Debug)]
pub struct LexedSource {
    pub metadata: FileMetadata,
    pub output: LexOutput,
    pub metrics: LexicalMetrics,
    pub duration: Duration,
}

impl LexedSource {
    pub fn is_ok(&self) -> bool {
        self.output.is_ok()
    }

    /// Token listing as printed and persisted, error line last
    pub fn listing(&self) -> String {
        let mut listing = crate::tokens::render_tokens(&self.output.tokens);
        if let Some(error) = &self.output.error {
            listing.push_str(&error.report());
            listing.push('\n');
        }
        listing
    }
}

fn load_file(
    path: &str,
    config: &RuntimeConfig,
    allow_empty: bool,
) -> Result<FileProcessingResult, PipelineError> {
    let processor = FileProcessor::from_preferences(&config.file_processor)
        .with_empty_allowed(allow_empty);
    Ok(processor.process_file(path)?)
}

/// Read and tokenize a source file. Lexical errors are returned inside the result, not as
/// `Err`, so the partial token list stays available.
pub fn lex_file(path: &str, config: &RuntimeConfig) -> Result<LexedSource, PipelineError> {
    let start_time = Instant::now();
    let file_result = load_file(path, config, config.file_processor.allow_empty_source)?;

    let mut analyzer = LexicalAnalyzer::with_preferences(config.lexical.clone());
    let output = analyzer.tokenize_file_result(&file_result);

    Ok(LexedSource {
        metadata: file_result.metadata,
        output,
        metrics: analyzer.metrics().clone(),
        duration: start_time.elapsed(),
    })
}

/// Persist a token listing in interchange form
pub fn write_token_file(path: &Path, lexed: &LexOutput) -> Result<(), PipelineError> {
    let output_error = |source: std::io::Error| PipelineError::Output {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    write_tokens(&mut writer, &lexed.tokens).map_err(output_error)?;

    if let Some(error) = &lexed.error {
        writeln!(writer, "{}", error.report()).map_err(output_error)?;
        writer.flush().map_err(output_error)?;
    }

    crate::log_success!(codes::success::TOKEN_FILE_WRITTEN, "Token file written",
        "file" => path.display().to_string(),
        "tokens" => lexed.tokens.len(),
        "lexical_error" => lexed.error.is_some()
    );

    Ok(())
}

fn load_grammar(
    path: &str,
    config: &RuntimeConfig,
) -> Result<(FileMetadata, CompiledGrammar), PipelineError> {
    // an empty grammar is reported by the compiler, not the file reader
    let file_result = load_file(path, config, true)?;
    let grammar = crate::grammar::compile_file_result(&file_result, &config.grammar)?;
    Ok((file_result.metadata, grammar))
}

/// Read and compile a grammar file
pub fn compile_grammar_file(
    path: &str,
    config: &RuntimeConfig,
) -> Result<CompiledGrammar, PipelineError> {
    load_grammar(path, config).map(|(_, grammar)| grammar)
}

/// Read a token file. The result ends with an end-marker.
pub fn read_token_file(
    path: &str,
    config: &RuntimeConfig,
) -> Result<Vec<SpannedToken>, PipelineError> {
    let file_result = load_file(path, config, true)?;
    let tokens = read_tokens(&file_result.source)?;

    crate::log_success!(codes::success::TOKEN_FILE_READ, "Token file read",
        "file" => path,
        "tokens" => tokens.len()
    );

    Ok(tokens)
}

/// Parse tokens against a compiled grammar
pub fn parse_tokens(
    grammar: &CompiledGrammar,
    tokens: Vec<SpannedToken>,
    config: &RuntimeConfig,
) -> Result<ParseSummary, PipelineError> {
    Ok(crate::syntax::parse_tokens(
        grammar,
        tokens,
        config.parser.clone(),
    )?)
}

/// Lex `source_path`, then parse the tokens with the grammar in `grammar_path`.
///
/// With `token_path`, the tokens are written to that file and the parser reads them back
/// from it. A lexical error is returned after the token file is written.
pub fn process_files(
    source_path: &str,
    grammar_path: &str,
    token_path: Option<&Path>,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(source_path), 0, || {
        crate::log_info!("Starting lexical and syntax analysis",
            "source" => source_path,
            "grammar" => grammar_path,
            "token_file" => token_path.map(|p| p.display().to_string()).unwrap_or_else(|| "-".to_string())
        );

        let lexed = lex_file(source_path, config)?;

        if let Some(path) = token_path {
            write_token_file(path, &lexed.output)?;
        }

        let LexedSource {
            metadata: source_metadata,
            output,
            metrics: lexical_metrics,
            duration: lexical_duration,
        } = lexed;

        let tokens = output.into_result()?;

        let grammar_start = Instant::now();
        let (grammar_metadata, grammar) = load_grammar(grammar_path, config)?;
        let grammar_duration = grammar_start.elapsed();

        let tokens = match token_path {
            Some(path) => read_token_file(&path.display().to_string(), config)?,
            None => tokens,
        };
        let token_count = tokens.len();

        let syntax_start = Instant::now();
        let parse_summary = parse_tokens(&grammar, tokens, config)?;
        let syntax_duration = syntax_start.elapsed();

        let result = PipelineResult::new(
            source_metadata,
            grammar_metadata,
            lexical_metrics,
            grammar.stats.clone(),
            parse_summary,
            token_count,
            StageTimings {
                lexical: lexical_duration,
                grammar: grammar_duration,
                syntax: syntax_duration,
                total: start_time.elapsed(),
            },
        );

        result.log_success(source_path);

        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::LexerError;
    use crate::syntax::SyntaxError;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const GRAMMAR: &str = "\
PROGRAM -> STMT PROGRAM | ε
STMT    -> id tk_assign EXPR tk_newline
         | while EXPR tk_colon tk_newline tk_indent PROGRAM tk_dedent
EXPR    -> TERM EXPR_REST
EXPR_REST -> tk_plus TERM EXPR_REST | tk_lt TERM EXPR_REST | ε
TERM    -> id | tk_integer
";

    fn write(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_process_files_through_token_file() {
        let dir = tempdir().unwrap();
        let source = write(
            dir.path(),
            "source.py",
            "i = 0\nwhile i < 10:\n    i = i + 1\n",
        );
        let grammar = write(dir.path(), "grammar.txt", GRAMMAR);
        let token_path = dir.path().join("tokens.txt");

        let result = process_files(
            &source,
            &grammar,
            Some(&token_path),
            &RuntimeConfig::default(),
        )
        .unwrap();

        assert!(result.parse_summary.matched_tokens > 0);
        assert_eq!(result.lexical_metrics.indent_tokens, 1);
        assert!(result.grammar_stats.non_terminals >= 5);

        let written = fs::read_to_string(&token_path).unwrap();
        assert!(written.starts_with("<id,i,1,1>\n<tk_assign,1,3>\n"));
        assert!(!written.contains(">>>"));
    }

    #[test]
    fn test_lexical_error_stops_before_grammar() {
        let dir = tempdir().unwrap();
        let source = write(dir.path(), "source.py", "x = 1\ny = 'open\n");
        let token_path = dir.path().join("tokens.txt");

        // the grammar file does not exist; a lexical error must be reported first
        let missing_grammar = dir.path().join("missing.txt").display().to_string();
        let error = process_files(
            &source,
            &missing_grammar,
            Some(&token_path),
            &RuntimeConfig::default(),
        )
        .unwrap_err();

        assert_matches!(
            error,
            PipelineError::LexicalAnalysis(LexerError::UnterminatedString { .. })
        );

        let written = fs::read_to_string(&token_path).unwrap();
        let last = written.lines().last().unwrap();
        assert_eq!(last, ">>> Lexical error (line: 2, column: 5)");
        assert!(written.starts_with("<id,x,1,1>"));
    }

    #[test]
    fn test_syntax_error_report() {
        let dir = tempdir().unwrap();
        let source = write(dir.path(), "source.py", "x = 1 +\n");
        let grammar = write(dir.path(), "grammar.txt", GRAMMAR);

        let error =
            process_files(&source, &grammar, None, &RuntimeConfig::default()).unwrap_err();

        assert_matches!(error, PipelineError::SyntaxAnalysis(SyntaxError::NoTableEntry { .. }));
        assert_eq!(
            error.report(),
            "<1,8> Syntax error in rule 'TERM': found \"tk_newline\"; expected: \"id\", \"tk_integer\"."
        );
    }

    #[test]
    fn test_lex_file_keeps_partial_tokens() {
        let dir = tempdir().unwrap();
        let source = write(dir.path(), "source.py", "a = 1 ? 2\n");

        let lexed = lex_file(&source, &RuntimeConfig::default()).unwrap();
        assert!(!lexed.is_ok());
        assert_eq!(lexed.output.tokens.len(), 3);
        assert_eq!(
            lexed.listing(),
            "<id,a,1,1>\n<tk_assign,1,3>\n<tk_integer,1,1,5>\n>>> Lexical error (line: 1, column: 7)\n"
        );
    }

    #[test]
    fn test_compile_grammar_and_read_token_file() {
        let dir = tempdir().unwrap();
        let grammar = write(dir.path(), "grammar.txt", "S -> ( id )\n");
        let tokens = write(dir.path(), "tokens.txt", "<(,1,1>\n<id,x,1,2>\n<),1,3>\n");
        let config = RuntimeConfig::default();

        let compiled = compile_grammar_file(&grammar, &config).unwrap();
        let tokens = read_token_file(&tokens, &config).unwrap();
        assert_eq!(tokens.len(), 4);
        assert!(parse_tokens(&compiled, tokens, &config).is_ok());
    }

    #[test]
    fn test_empty_grammar_file_is_a_grammar_error() {
        let dir = tempdir().unwrap();
        let grammar = write(dir.path(), "grammar.txt", "");

        let error = compile_grammar_file(&grammar, &RuntimeConfig::default()).unwrap_err();
        assert_matches!(error, PipelineError::GrammarCompilation(_));
    }

    #[test]
    fn test_missing_source_file() {
        let error = lex_file("/nonexistent/source.py", &RuntimeConfig::default()).unwrap_err();
        assert_matches!(error, PipelineError::FileProcessing(_));
    }
}
