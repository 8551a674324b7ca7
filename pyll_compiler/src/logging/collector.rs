//! Per-file diagnostic collection with cargo-style output
//!
//! A run touches a source file, a grammar file and possibly a token file; diagnostics are
//! grouped by the file that was being processed when they were raised.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// The file a thread is currently working on
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub elapsed: Duration,
}

impl ProcessingSummary {
    pub fn clean_files(&self) -> usize {
        self.total_files - self.failed_files - self.files_with_warnings
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

#[derive(Default)]
struct CollectorState {
    files: BTreeSet<PathBuf>,
    events: BTreeMap<PathBuf, Vec<LogEvent>>,
    total: usize,
}

/// Errors and warnings, keyed by file
pub struct ErrorCollector {
    state: Mutex<CollectorState>,
    started: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CollectorState::default()),
            started: Instant::now(),
        }
    }

    /// Note that a file was entered, even if it never produces a diagnostic
    pub fn record_file(&self, file_path: &Path) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(file_path.to_path_buf());
    }

    /// Store an event for a file. Past `MAX_LOG_EVENTS_PER_FILE` one overflow warning is
    /// stored and the rest dropped; past `MAX_ERROR_COLLECTION` everything is dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut state = self.state.lock().unwrap();
        if state.total >= MAX_ERROR_COLLECTION {
            return;
        }

        state.files.insert(file_path.to_path_buf());
        let file_events = state.events.entry(file_path.to_path_buf()).or_default();

        let stored = match file_events.len() {
            n if n < MAX_LOG_EVENTS_PER_FILE => {
                file_events.push(event);
                true
            }
            n if n == MAX_LOG_EVENTS_PER_FILE => {
                file_events.push(LogEvent::warning(&format!(
                    "Further diagnostics for this file suppressed (limit {})",
                    MAX_LOG_EVENTS_PER_FILE
                )));
                true
            }
            _ => false,
        };

        if stored {
            state.total += 1;
        }
    }

    pub fn file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.state
            .lock()
            .unwrap()
            .events
            .get(file_path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        self.file_events(file_path).iter().any(LogEvent::is_error)
    }

    pub fn summary(&self) -> ProcessingSummary {
        let state = self.state.lock().unwrap();
        let mut summary = ProcessingSummary {
            total_files: state.files.len(),
            elapsed: self.started.elapsed(),
            ..Default::default()
        };

        for events in state.events.values() {
            let errors = events.iter().filter(|e| e.is_error()).count();
            let warnings = events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

    pub fn clear(&self) {
        *self.state.lock().unwrap() = CollectorState::default();
    }

    /// Cargo-style report of every collected error and warning. Empty when nothing was
    /// collected.
    pub fn render(&self) -> String {
        let events = self.state.lock().unwrap().events.clone();
        let mut output = String::new();

        for (file_path, events) in &events {
            let shown: Vec<&LogEvent> = events
                .iter()
                .filter(|e| e.is_error() || e.is_warning())
                .collect();
            if shown.is_empty() {
                continue;
            }

            let _ = writeln!(output, "Checking {}...", file_path.display());
            for event in shown {
                render_event(&mut output, event, file_path);
            }
            output.push('\n');
        }

        let summary = self.summary();
        if summary.total_errors > 0 {
            let _ = writeln!(output, "Total errors: {}", summary.total_errors);
        }
        if summary.total_warnings > 0 {
            let _ = writeln!(output, "Total warnings: {}", summary.total_warnings);
        }

        output
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn render_event(output: &mut String, event: &LogEvent, file_path: &Path) {
    let label = if event.is_error() { "error" } else { "warning" };
    let location = event
        .span
        .map(|s| {
            format!(
                " --> {}:{}:{}",
                file_path.display(),
                s.start().line,
                s.start().column
            )
        })
        .unwrap_or_default();

    let _ = writeln!(output, "{}[{}]: {}{}", label, event.code, event.message, location);

    if event.is_error() {
        let _ = writeln!(
            output,
            "  = severity: {}, category: {}",
            event.severity(),
            event.category()
        );
    }

    for (key, value) in &event.context {
        if key != "file" && key != "file_id" {
            let _ = writeln!(output, "  = {}: {}", key, value);
        }
    }

    if event.is_error() && super::codes::get_error_metadata(event.code.as_str()).is_some() {
        let _ = writeln!(output, "  = help: {}", event.recommended_action());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_events_are_grouped_by_file() {
        let collector = ErrorCollector::new();
        let source = PathBuf::from("program.py");

        collector.record_event(
            &source,
            LogEvent::error(codes::lexical::UNTERMINATED_STRING, "Unterminated string"),
        );

        assert_eq!(collector.file_events(&source).len(), 1);
        assert!(collector.file_has_errors(&source));
        assert!(!collector.file_has_errors(Path::new("grammar.txt")));
    }

    #[test]
    fn test_summary_counts_files() {
        let collector = ErrorCollector::new();
        collector.record_file(Path::new("tokens.txt"));
        collector.record_event(
            Path::new("program.py"),
            LogEvent::error(codes::lexical::INVALID_CHARACTER, "Error"),
        );
        collector.record_event(Path::new("grammar.txt"), LogEvent::warning("Warning"));

        let summary = collector.summary();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(summary.clean_files(), 1);
        assert!(summary.has_errors());

        collector.clear();
        assert_eq!(collector.summary().total_files, 0);
    }

    #[test]
    fn test_per_file_limit_appends_single_overflow_warning() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("noisy.py");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(&file_path, LogEvent::warning("repeated"));
        }

        let events = collector.file_events(&file_path);
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_FILE + 1);
        assert!(events
            .last()
            .map(|e| e.message.starts_with("Further diagnostics"))
            .unwrap_or(false));
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("program.py");

        collector.record_event(
            &file_path,
            LogEvent::error(codes::lexical::INVALID_CHARACTER, "Unrecognized character '?'")
                .with_span(Span::single(Position::new(4, 2, 5)))
                .with_context("character", "?")
                .with_context("file", "program.py"),
        );

        let output = collector.render();
        assert!(output.starts_with("Checking program.py...\n"));
        assert!(output.contains("error[E020]: Unrecognized character '?' --> program.py:2:5"));
        assert!(output.contains("= character: ?"));
        assert!(!output.contains("= file:"));
        assert!(output.contains("= help:"));
        assert!(output.ends_with("Total errors: 1\n"));
    }
}
