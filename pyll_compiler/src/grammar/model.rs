//! Grammar data model: productions, symbol classes and the rule map

use crate::tokens::token::END_MARKER;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// The empty alternative
pub const EPSILON: &str = "ε";

/// Right-hand side of a rule. An empty alternative is the single symbol `ε`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Production {
    symbols: Vec<String>,
}

impl Production {
    pub fn new(symbols: Vec<String>) -> Self {
        Self { symbols }
    }

    pub fn epsilon() -> Self {
        Self {
            symbols: vec![EPSILON.to_string()],
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbols.len() == 1 && self.symbols[0] == EPSILON
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbols.join(" "))
    }
}

/// How a grammar symbol is treated by the set computations and the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
    Epsilon,
    /// Upper-case reference with no rule of its own
    Unrecognized,
}

/// Upper-case naming: at least one cased character and no lower-case ones
pub fn is_upper_case_symbol(symbol: &str) -> bool {
    symbol.chars().any(char::is_uppercase) && !symbol.chars().any(char::is_lowercase)
}

#[derive(Debug, Clone)]
pub struct Grammar {
    start_symbol: String,
    /// Discovery order
    non_terminals: Vec<String>,
    rules: HashMap<String, Vec<Production>>,
    terminals: BTreeSet<String>,
    undefined: BTreeSet<String>,
}

impl Grammar {
    /// Build from rules in discovery order. Symbols with a rule are non-terminals; other
    /// upper-case symbols are recorded as undefined; the rest are terminals, plus `$`.
    pub fn from_rules(rules: Vec<(String, Vec<Production>)>) -> Option<Self> {
        let start_symbol = rules.first()?.0.clone();

        let non_terminals: Vec<String> = rules.iter().map(|(lhs, _)| lhs.clone()).collect();
        let rule_map: HashMap<String, Vec<Production>> = rules.into_iter().collect();

        let mut terminals = BTreeSet::new();
        let mut undefined = BTreeSet::new();
        for productions in rule_map.values() {
            for symbol in productions.iter().flat_map(|p| p.symbols()) {
                if symbol == EPSILON || rule_map.contains_key(symbol) {
                    continue;
                }
                if is_upper_case_symbol(symbol) {
                    undefined.insert(symbol.clone());
                } else {
                    terminals.insert(symbol.clone());
                }
            }
        }
        terminals.insert(END_MARKER.to_string());

        Some(Self {
            start_symbol,
            non_terminals,
            rules: rule_map,
            terminals,
            undefined,
        })
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn non_terminals(&self) -> &[String] {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &BTreeSet<String> {
        &self.terminals
    }

    /// Upper-case symbols referenced without a rule
    pub fn undefined_symbols(&self) -> &BTreeSet<String> {
        &self.undefined
    }

    pub fn productions(&self, non_terminal: &str) -> &[Production] {
        self.rules
            .get(non_terminal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn production_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn classify(&self, symbol: &str) -> SymbolKind {
        if symbol == EPSILON {
            SymbolKind::Epsilon
        } else if self.rules.contains_key(symbol) {
            SymbolKind::NonTerminal
        } else if self.terminals.contains(symbol) {
            SymbolKind::Terminal
        } else {
            SymbolKind::Unrecognized
        }
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.classify(symbol) == SymbolKind::Terminal
    }

    pub fn is_non_terminal(&self, symbol: &str) -> bool {
        self.rules.contains_key(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prod(text: &str) -> Production {
        Production::new(text.split_whitespace().map(String::from).collect())
    }

    #[test]
    fn test_upper_case_detection() {
        assert!(is_upper_case_symbol("EXPR"));
        assert!(is_upper_case_symbol("E1"));
        assert!(is_upper_case_symbol("T_LIST"));
        assert!(!is_upper_case_symbol("Ep"));
        assert!(!is_upper_case_symbol("+"));
        assert!(!is_upper_case_symbol("tk_plus"));
    }

    #[test]
    fn test_symbol_classification() {
        let grammar = Grammar::from_rules(vec![
            ("E".to_string(), vec![prod("T Ep")]),
            ("Ep".to_string(), vec![prod("+ T Ep"), Production::epsilon()]),
            ("T".to_string(), vec![prod("num"), prod("LPAREN")]),
        ])
        .unwrap();

        assert_eq!(grammar.start_symbol(), "E");
        assert_eq!(grammar.non_terminals(), &["E", "Ep", "T"]);
        assert_eq!(grammar.classify("Ep"), SymbolKind::NonTerminal);
        assert_eq!(grammar.classify("num"), SymbolKind::Terminal);
        assert_eq!(grammar.classify("$"), SymbolKind::Terminal);
        assert_eq!(grammar.classify(EPSILON), SymbolKind::Epsilon);
        assert_eq!(grammar.classify("LPAREN"), SymbolKind::Unrecognized);
        assert!(grammar.undefined_symbols().contains("LPAREN"));
        assert_eq!(grammar.production_count(), 5);

        let terminals: Vec<&str> = grammar.terminals().iter().map(String::as_str).collect();
        assert_eq!(terminals, vec!["$", "+", "num"]);
    }

    #[test]
    fn test_empty_rules() {
        assert!(Grammar::from_rules(Vec::new()).is_none());
    }
}
