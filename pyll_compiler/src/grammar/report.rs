//! Text rendering of the computed sets and the parse table, in rule discovery order

use super::sets::SymbolSet;
use super::CompiledGrammar;
use std::fmt::Write;

fn format_set(set: &SymbolSet) -> String {
    let items: Vec<&str> = set.iter().map(String::as_str).collect();
    format!("{{ {} }}", items.join(", "))
}

pub fn render_first_sets(compiled: &CompiledGrammar) -> String {
    let mut out = String::from("FIRST sets:\n");
    for nt in compiled.grammar.non_terminals() {
        if let Some(set) = compiled.first.get(nt) {
            let _ = writeln!(out, "FIRST({}) = {}", nt, format_set(set));
        }
    }
    out
}

pub fn render_follow_sets(compiled: &CompiledGrammar) -> String {
    let mut out = String::from("FOLLOW sets:\n");
    for nt in compiled.grammar.non_terminals() {
        if let Some(set) = compiled.follow.get(nt) {
            let _ = writeln!(out, "FOLLOW({}) = {}", nt, format_set(set));
        }
    }
    out
}

pub fn render_prediction_sets(compiled: &CompiledGrammar) -> String {
    let mut out = String::from("Prediction sets:\n");
    for nt in compiled.grammar.non_terminals() {
        for prediction in compiled.predictions.get(nt).into_iter().flatten() {
            let _ = writeln!(
                out,
                "PREDICT({} -> {}) = {}",
                nt,
                prediction.production,
                format_set(&prediction.lookahead)
            );
        }
    }
    out
}

pub fn render_parse_table(compiled: &CompiledGrammar) -> String {
    let mut out = String::from("Parse table:\n");
    for nt in compiled.grammar.non_terminals() {
        for (terminal, production) in compiled.table.row(nt) {
            let _ = writeln!(out, "M[{}, {}] = {}", nt, terminal, production);
        }
    }
    out
}

/// All four sections, separated by blank lines
pub fn render_report(compiled: &CompiledGrammar) -> String {
    [
        render_first_sets(compiled),
        render_follow_sets(compiled),
        render_prediction_sets(compiled),
        render_parse_table(compiled),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::compile_str;

    #[test]
    fn test_report_sections_follow_discovery_order() {
        let compiled = compile_str("S -> B a\nB -> b | ε\n").unwrap();
        let report = render_report(&compiled);

        assert!(report.starts_with("FIRST sets:\nFIRST(S) = { a, b }\nFIRST(B) = { b, ε }\n"));
        assert!(report.contains("FOLLOW(B) = { a }"));
        assert!(report.contains("PREDICT(B -> ε) = { a }"));
        assert!(report.contains("Parse table:\nM[S, a] = B a\nM[S, b] = B a\nM[B, a] = ε\nM[B, b] = b\n"));
    }
}
