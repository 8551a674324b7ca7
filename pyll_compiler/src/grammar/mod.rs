//! LL(1) grammar compiler
//!
//! Reads a grammar in `LHS -> alt | alt` form and produces FIRST, FOLLOW and prediction
//! sets plus the parse table used by the syntax analyzer. Any cell of the table claimed
//! by two productions aborts compilation.
//!
//! ## Symbols
//!
//! - A symbol with a rule of its own is a non-terminal.
//! - `ε` is the empty alternative.
//! - Upper-case symbols without a rule are reported as warnings and treated as
//!   unrecognized: they start themselves in FIRST and cut FOLLOW propagation.
//! - Everything else, plus `$`, is a terminal. Terminals are token kinds or lexemes.

pub mod error;
pub mod model;
pub mod reader;
pub mod report;
pub mod sets;
pub mod table;

pub use error::{GrammarError, GrammarResult};
pub use model::{Grammar, Production, SymbolKind, EPSILON};
pub use sets::{Prediction, PredictionSets, SymbolSet, SymbolSets};
pub use table::ParseTable;

use crate::config::runtime::GrammarPreferences;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success, log_warning};
use serde::Serialize;

/// A grammar with every derived structure
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub grammar: Grammar,
    pub first: SymbolSets,
    pub follow: SymbolSets,
    pub predictions: PredictionSets,
    pub table: ParseTable,
    pub stats: GrammarStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GrammarStats {
    pub non_terminals: usize,
    pub terminals: usize,
    pub productions: usize,
    pub table_entries: usize,
    pub undefined_symbols: usize,
    pub first_iterations: usize,
    pub follow_iterations: usize,
}

impl CompiledGrammar {
    pub fn start_symbol(&self) -> &str {
        self.grammar.start_symbol()
    }
}

/// Compile grammar text. `origin` names the source in diagnostics.
pub fn compile(
    source: &str,
    origin: &str,
    preferences: &GrammarPreferences,
) -> GrammarResult<CompiledGrammar> {
    log_debug!("Starting grammar compilation",
        "origin" => origin,
        "bytes" => source.len()
    );

    let result = compile_inner(source, origin, preferences);

    if let Err(error) = &result {
        // conflicts are logged where they are detected
        if !matches!(error, GrammarError::Ll1Conflict { .. }) {
            log_error!(error.error_code(), &error.to_string(),
                "origin" => origin,
                "line" => error.line().map(|l| l.to_string()).unwrap_or_else(|| "-".to_string())
            );
        }
    }

    result
}

fn compile_inner(
    source: &str,
    origin: &str,
    preferences: &GrammarPreferences,
) -> GrammarResult<CompiledGrammar> {
    let grammar = reader::parse_grammar(source, origin)?;

    if preferences.warn_on_undefined_non_terminals {
        for symbol in grammar.undefined_symbols() {
            log_warning!(code = codes::grammar::UNDEFINED_NON_TERMINAL,
                "Upper-case symbol has no rule and is treated as unrecognized",
                "symbol" => symbol,
                "origin" => origin
            );
        }
    }

    let first = sets::compute_first_sets(&grammar)?;
    let follow = sets::compute_follow_sets(&grammar, &first.sets)?;

    if preferences.log_set_iterations {
        log_debug!("Set computation converged",
            "first_iterations" => first.iterations,
            "follow_iterations" => follow.iterations
        );
    }

    let predictions = sets::compute_prediction_sets(&grammar, &first.sets, &follow.sets);
    let table = ParseTable::build(&grammar, &predictions)?;

    log_success!(codes::success::PARSE_TABLE_BUILT, "Parse table built",
        "entries" => table.len()
    );

    let stats = GrammarStats {
        non_terminals: grammar.non_terminals().len(),
        terminals: grammar.terminals().len(),
        productions: grammar.production_count(),
        table_entries: table.len(),
        undefined_symbols: grammar.undefined_symbols().len(),
        first_iterations: first.iterations,
        follow_iterations: follow.iterations,
    };

    log_success!(codes::success::GRAMMAR_COMPILED, "Grammar compiled",
        "origin" => origin,
        "start_symbol" => grammar.start_symbol(),
        "non_terminals" => stats.non_terminals,
        "terminals" => stats.terminals,
        "productions" => stats.productions
    );

    Ok(CompiledGrammar {
        grammar,
        first: first.sets,
        follow: follow.sets,
        predictions,
        table,
        stats,
    })
}

/// Compile with default preferences
pub fn compile_str(source: &str) -> GrammarResult<CompiledGrammar> {
    compile(source, "<inline>", &GrammarPreferences::default())
}

/// Compile a loaded grammar file
pub fn compile_file_result(
    file_result: &FileProcessingResult,
    preferences: &GrammarPreferences,
) -> GrammarResult<CompiledGrammar> {
    let origin = file_result.metadata.path.display().to_string();
    compile(&file_result.source, &origin, preferences)
}

/// Check that every grammar error code is registered
pub fn init_grammar_logging() -> Result<(), String> {
    let grammar_codes = [
        codes::grammar::MISSING_INPUT,
        codes::grammar::RULE_BEFORE_HEADER,
        codes::grammar::MALFORMED_HEADER,
        codes::grammar::LL1_CONFLICT,
        codes::grammar::UNDEFINED_NON_TERMINAL,
        codes::grammar::GRAMMAR_TOO_LARGE,
        codes::grammar::SETS_DID_NOT_CONVERGE,
    ];

    for code in &grammar_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Grammar error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_compile_expression_grammar() {
        let compiled = compile_str("E -> T Ep\nEp -> + T Ep | ε\nT -> num\n").unwrap();

        assert_eq!(compiled.start_symbol(), "E");
        assert_eq!(compiled.stats.non_terminals, 3);
        assert_eq!(compiled.stats.terminals, 3);
        assert_eq!(compiled.stats.productions, 4);
        assert_eq!(compiled.stats.table_entries, 4);
        assert!(compiled.first["Ep"].contains(EPSILON));
        assert!(compiled.follow["T"].contains("+"));
    }

    #[test]
    fn test_init_logging() {
        assert!(init_grammar_logging().is_ok());
    }

    #[test]
    fn test_undefined_symbols_are_counted() {
        let compiled = compile_str("S -> a MISSING\n").unwrap();
        assert_eq!(compiled.stats.undefined_symbols, 1);
    }

    #[test]
    fn test_errors_propagate() {
        assert_matches!(compile_str(""), Err(GrammarError::MissingInput { .. }));
        assert_matches!(
            compile_str("S -> a | a\n"),
            Err(GrammarError::Ll1Conflict { .. })
        );
    }
}
