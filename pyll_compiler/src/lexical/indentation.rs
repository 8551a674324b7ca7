//! Indentation tracking
//!
//! The stack holds indentation widths, bottom always 0 and strictly increasing upward.

use super::error::LexerError;
use crate::config::compile_time::lexical::MAX_INDENT_DEPTH;
use crate::utils::Position;

/// Tabs advance the width to the next multiple of this
pub const TAB_STOP: usize = 8;

/// Result of comparing a line's width against the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentChange {
    Same,
    Indent,
    /// Number of levels closed
    Dedent(usize),
}

#[derive(Debug, Clone)]
pub struct IndentStack {
    levels: Vec<usize>,
}

impl IndentStack {
    pub fn new() -> Self {
        Self { levels: vec![0] }
    }

    pub fn current(&self) -> usize {
        self.levels.last().copied().unwrap_or(0)
    }

    /// Open levels above the base
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    /// Apply the width of a new logical line
    pub fn update(&mut self, width: usize, position: Position) -> Result<IndentChange, LexerError> {
        let current = self.current();

        if width == current {
            return Ok(IndentChange::Same);
        }

        if width > current {
            if self.depth() >= MAX_INDENT_DEPTH {
                return Err(LexerError::IndentationTooDeep {
                    depth: self.depth() + 1,
                    position,
                });
            }
            self.levels.push(width);
            return Ok(IndentChange::Indent);
        }

        let mut closed = 0;
        while self.levels.len() > 1 && self.current() > width {
            self.levels.pop();
            closed += 1;
        }

        if self.current() != width {
            return Err(LexerError::IndentationMismatch { width, position });
        }

        Ok(IndentChange::Dedent(closed))
    }

    /// Pop every open level, returning how many were closed
    pub fn close_all(&mut self) -> usize {
        let closed = self.depth();
        self.levels.truncate(1);
        closed
    }
}

impl Default for IndentStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Measure a leading whitespace run. Spaces add one, tabs advance to the next tab stop,
/// formfeeds are ignored. A run containing both tabs and spaces is rejected.
pub fn measure_indentation(run: &str, line_start: Position) -> Result<usize, LexerError> {
    let has_space = run.contains(' ');
    let has_tab = run.contains('\t');
    if has_space && has_tab {
        return Err(LexerError::MixedIndentation {
            position: line_start,
        });
    }

    let mut width = 0;
    for ch in run.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width = (width / TAB_STOP + 1) * TAB_STOP,
            _ => {}
        }
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pos() -> Position {
        Position::start()
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure_indentation("    ", pos()).unwrap(), 4);
        assert_eq!(measure_indentation("\t", pos()).unwrap(), 8);
        assert_eq!(measure_indentation("\t\t", pos()).unwrap(), 16);
        assert_eq!(measure_indentation("\x0c  ", pos()).unwrap(), 2);
        assert_matches!(
            measure_indentation(" \t", pos()),
            Err(LexerError::MixedIndentation { .. })
        );
    }

    #[test]
    fn test_push_and_pop_levels() {
        let mut stack = IndentStack::new();
        assert_eq!(stack.update(0, pos()).unwrap(), IndentChange::Same);
        assert_eq!(stack.update(4, pos()).unwrap(), IndentChange::Indent);
        assert_eq!(stack.update(8, pos()).unwrap(), IndentChange::Indent);
        assert_eq!(stack.levels(), &[0, 4, 8]);
        assert_eq!(stack.update(0, pos()).unwrap(), IndentChange::Dedent(2));
        assert_eq!(stack.levels(), &[0]);
    }

    #[test]
    fn test_inconsistent_dedent() {
        let mut stack = IndentStack::new();
        stack.update(4, pos()).unwrap();
        assert_matches!(
            stack.update(2, pos()),
            Err(LexerError::IndentationMismatch { width: 2, .. })
        );
        // never underflows
        assert_eq!(stack.levels(), &[0]);
    }

    #[test]
    fn test_close_all() {
        let mut stack = IndentStack::new();
        stack.update(2, pos()).unwrap();
        stack.update(4, pos()).unwrap();
        assert_eq!(stack.close_all(), 2);
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.close_all(), 0);
    }
}
