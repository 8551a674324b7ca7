//! FIRST, FOLLOW and prediction sets
//!
//! FIRST and FOLLOW are computed by fixed-point iteration over the rules in discovery
//! order. Both only ever grow, so the loops terminate; the pass count is still bounded by
//! `MAX_SET_ITERATIONS`.

use super::error::{GrammarError, GrammarResult};
use super::model::{Grammar, Production, SymbolKind, EPSILON};
use crate::config::compile_time::grammar::MAX_SET_ITERATIONS;
use crate::tokens::token::END_MARKER;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub type SymbolSet = BTreeSet<String>;

/// Non-terminal to set of terminals
pub type SymbolSets = BTreeMap<String, SymbolSet>;

/// One production together with the lookaheads that select it
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub production: Production,
    pub lookahead: SymbolSet,
}

pub type PredictionSets = BTreeMap<String, Vec<Prediction>>;

/// A computed set family and the number of passes it took
#[derive(Debug, Clone)]
pub struct FixedPoint {
    pub sets: SymbolSets,
    pub iterations: usize,
}

fn empty_sets(grammar: &Grammar) -> SymbolSets {
    grammar
        .non_terminals()
        .iter()
        .map(|nt| (nt.clone(), SymbolSet::new()))
        .collect()
}

/// Walk a symbol sequence left to right collecting what can start it. Returns the
/// collected terminals and whether every symbol can derive ε.
pub fn first_of_sequence(
    grammar: &Grammar,
    first: &SymbolSets,
    symbols: &[String],
) -> (SymbolSet, bool) {
    let mut result = SymbolSet::new();

    for symbol in symbols {
        match grammar.classify(symbol) {
            SymbolKind::Epsilon => continue,
            SymbolKind::Terminal | SymbolKind::Unrecognized => {
                result.insert(symbol.clone());
                return (result, false);
            }
            SymbolKind::NonTerminal => {
                let Some(set) = first.get(symbol) else {
                    return (result, false);
                };
                result.extend(set.iter().filter(|s| *s != EPSILON).cloned());
                if !set.contains(EPSILON) {
                    return (result, false);
                }
            }
        }
    }

    (result, true)
}

pub fn compute_first_sets(grammar: &Grammar) -> GrammarResult<FixedPoint> {
    let mut first = empty_sets(grammar);
    let mut iterations = 0;

    loop {
        iterations += 1;
        if iterations > MAX_SET_ITERATIONS {
            return Err(GrammarError::NotConverged {
                set: "FIRST",
                iterations: MAX_SET_ITERATIONS,
            });
        }

        let mut changed = false;
        for nt in grammar.non_terminals() {
            for production in grammar.productions(nt) {
                let additions = if production.is_epsilon() {
                    SymbolSet::from([EPSILON.to_string()])
                } else {
                    let (mut set, nullable) =
                        first_of_sequence(grammar, &first, production.symbols());
                    if nullable {
                        set.insert(EPSILON.to_string());
                    }
                    set
                };

                if let Some(target) = first.get_mut(nt) {
                    let before = target.len();
                    target.extend(additions);
                    changed |= target.len() > before;
                }
            }
        }

        if !changed {
            return Ok(FixedPoint {
                sets: first,
                iterations,
            });
        }
    }
}

pub fn compute_follow_sets(grammar: &Grammar, first: &SymbolSets) -> GrammarResult<FixedPoint> {
    let mut follow = empty_sets(grammar);
    if let Some(start) = follow.get_mut(grammar.start_symbol()) {
        start.insert(END_MARKER.to_string());
    }
    let mut iterations = 0;

    loop {
        iterations += 1;
        if iterations > MAX_SET_ITERATIONS {
            return Err(GrammarError::NotConverged {
                set: "FOLLOW",
                iterations: MAX_SET_ITERATIONS,
            });
        }

        let mut changed = false;
        for nt in grammar.non_terminals() {
            for production in grammar.productions(nt) {
                let mut trailing = follow.get(nt).cloned().unwrap_or_default();

                for symbol in production.symbols().iter().rev() {
                    match grammar.classify(symbol) {
                        SymbolKind::NonTerminal => {
                            if let Some(target) = follow.get_mut(symbol) {
                                let before = target.len();
                                target.extend(trailing.iter().cloned());
                                changed |= target.len() > before;
                            }

                            let symbol_first = first.get(symbol).cloned().unwrap_or_default();
                            if symbol_first.contains(EPSILON) {
                                trailing.extend(symbol_first.into_iter().filter(|s| s != EPSILON));
                            } else {
                                trailing = symbol_first;
                            }
                        }
                        SymbolKind::Terminal => trailing = SymbolSet::from([symbol.clone()]),
                        SymbolKind::Unrecognized => trailing.clear(),
                        SymbolKind::Epsilon => {}
                    }
                }
            }
        }

        if !changed {
            return Ok(FixedPoint {
                sets: follow,
                iterations,
            });
        }
    }
}

/// Lookaheads per production: the FIRST walk, plus FOLLOW of the rule when the whole
/// production can derive ε
pub fn compute_prediction_sets(
    grammar: &Grammar,
    first: &SymbolSets,
    follow: &SymbolSets,
) -> PredictionSets {
    let mut predictions = PredictionSets::new();

    for nt in grammar.non_terminals() {
        let nt_follow = follow.get(nt).cloned().unwrap_or_default();

        let entries = grammar
            .productions(nt)
            .iter()
            .map(|production| {
                let lookahead = if production.is_epsilon() {
                    nt_follow.clone()
                } else {
                    let (mut set, nullable) =
                        first_of_sequence(grammar, first, production.symbols());
                    if nullable {
                        set.extend(nt_follow.iter().cloned());
                    }
                    set
                };
                Prediction {
                    production: production.clone(),
                    lookahead,
                }
            })
            .collect();

        predictions.insert(nt.clone(), entries);
    }

    predictions
}
