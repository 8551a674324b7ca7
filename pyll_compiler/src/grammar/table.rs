//! LL(1) parse table

use super::error::{GrammarError, GrammarResult};
use super::model::{Grammar, Production};
use super::sets::PredictionSets;
use crate::log_error;
use std::collections::BTreeMap;

/// Partial map `(non-terminal, terminal) -> production`
#[derive(Debug, Clone, Default)]
pub struct ParseTable {
    entries: BTreeMap<(String, String), Production>,
}

impl ParseTable {
    /// Fill the table from prediction sets. A cell claimed twice is a conflict.
    pub fn build(grammar: &Grammar, predictions: &PredictionSets) -> GrammarResult<Self> {
        let mut entries: BTreeMap<(String, String), Production> = BTreeMap::new();

        for nt in grammar.non_terminals() {
            let Some(rule_predictions) = predictions.get(nt) else {
                continue;
            };

            for prediction in rule_predictions {
                for terminal in &prediction.lookahead {
                    let key = (nt.clone(), terminal.clone());
                    if let Some(existing) = entries.get(&key) {
                        let error = GrammarError::Ll1Conflict {
                            non_terminal: nt.clone(),
                            terminal: terminal.clone(),
                            existing: existing.to_string(),
                            conflicting: prediction.production.to_string(),
                        };
                        log_error!(error.error_code(), "Grammar is not LL(1)",
                            "non_terminal" => nt,
                            "terminal" => terminal,
                            "existing" => existing,
                            "conflicting" => &prediction.production
                        );
                        return Err(error);
                    }
                    entries.insert(key, prediction.production.clone());
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, non_terminal: &str, terminal: &str) -> Option<&Production> {
        self.entries
            .get(&(non_terminal.to_string(), terminal.to_string()))
    }

    /// Look up by token kind, falling back to the lexeme
    pub fn lookup(
        &self,
        non_terminal: &str,
        kind: &str,
        lexeme: Option<&str>,
    ) -> Option<&Production> {
        self.get(non_terminal, kind)
            .or_else(|| lexeme.and_then(|lexeme| self.get(non_terminal, lexeme)))
    }

    /// Terminals with an entry in the row of `non_terminal`, sorted
    pub fn expected_terminals(&self, non_terminal: &str) -> Vec<String> {
        self.row(non_terminal)
            .map(|(terminal, _)| terminal.to_string())
            .collect()
    }

    /// Entries of one row, ordered by terminal
    pub fn row<'a>(
        &'a self,
        non_terminal: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Production)> + 'a {
        self.entries
            .range((non_terminal.to_string(), String::new())..)
            .take_while(move |((nt, _), _)| nt == non_terminal)
            .map(|((_, terminal), production)| (terminal.as_str(), production))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
