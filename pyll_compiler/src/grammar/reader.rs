//! Grammar text reader
//!
//! Line oriented. `#` starts a comment, blank lines are skipped. A header line
//! `LHS -> alt1 | alt2` opens a rule; later lines without `->` add `|`-separated
//! alternatives to the most recent rule. A left-hand side seen twice keeps extending the
//! same rule.

use super::error::{GrammarError, GrammarResult};
use super::model::{Grammar, Production, EPSILON};
use crate::config::compile_time::grammar::*;
use crate::tokens::token::END_MARKER;

const ARROW: &str = "->";

/// Parse grammar text into rules
pub fn parse_grammar(source: &str, origin: &str) -> GrammarResult<Grammar> {
    let mut rules: Vec<(String, Vec<Production>)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut production_count = 0usize;

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let alternatives = match line.split_once(ARROW) {
            Some((lhs, rhs)) => {
                let lhs = validate_lhs(lhs, line, line_number)?;
                let slot = match rules.iter().position(|(name, _)| name == lhs) {
                    Some(slot) => slot,
                    None => {
                        rules.push((lhs.to_string(), Vec::new()));
                        rules.len() - 1
                    }
                };
                current = Some(slot);
                rhs
            }
            None => {
                if current.is_none() {
                    return Err(GrammarError::RuleBeforeHeader {
                        line: line_number,
                        content: line.to_string(),
                    });
                }
                line
            }
        };

        let Some(slot) = current else {
            continue;
        };

        for alternative in alternatives.split('|') {
            if let Some(production) = parse_alternative(alternative, line_number)? {
                production_count += 1;
                if production_count > MAX_RULES {
                    return Err(GrammarError::TooManyRules {
                        count: production_count,
                    });
                }
                rules[slot].1.push(production);
            }
        }
    }

    Grammar::from_rules(rules).ok_or_else(|| GrammarError::MissingInput {
        origin: origin.to_string(),
    })
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("")
}

/// A left-hand side is a single symbol other than `ε` and `$`
fn validate_lhs<'a>(lhs: &'a str, line: &str, line_number: usize) -> GrammarResult<&'a str> {
    let lhs = lhs.trim();
    let valid = !lhs.is_empty()
        && !lhs.contains(char::is_whitespace)
        && !lhs.contains('|')
        && lhs != EPSILON
        && lhs != END_MARKER;

    if valid {
        Ok(lhs)
    } else {
        Err(GrammarError::MalformedHeader {
            line: line_number,
            content: line.to_string(),
        })
    }
}

/// Empty alternatives are dropped. `ε` next to other symbols is removed.
fn parse_alternative(text: &str, line_number: usize) -> GrammarResult<Option<Production>> {
    let symbols: Vec<String> = text.split_whitespace().map(String::from).collect();
    if symbols.is_empty() {
        return Ok(None);
    }

    if symbols.len() > MAX_SYMBOLS_PER_PRODUCTION {
        return Err(GrammarError::ProductionTooLong {
            line: line_number,
            count: symbols.len(),
        });
    }

    let non_empty: Vec<String> = symbols.into_iter().filter(|s| s != EPSILON).collect();
    if non_empty.is_empty() {
        Ok(Some(Production::epsilon()))
    } else {
        Ok(Some(Production::new(non_empty)))
    }
}
