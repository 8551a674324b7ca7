//! Global structured logging
//!
//! One `LoggingService` and one `ErrorCollector` are installed per process. Stages log
//! through the `log_*!` macros; events raised while a file context is active are tagged
//! with that file and errors and warnings are kept for the end-of-run summary.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::OnceLock;

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<LoggingService> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<ErrorCollector> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

/// Install the global logger built from the runtime logging preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Invalid logging limits: {}", e))?;
    init_global_logging_with_service(LoggingService::from_preferences())
}

/// Install a specific service. Fails if logging is already initialized.
pub fn init_global_logging_with_service(service: LoggingService) -> Result<(), String> {
    for code in [
        codes::system::INTERNAL_ERROR,
        codes::lexical::INVALID_CHARACTER,
        codes::grammar::LL1_CONFLICT,
        codes::syntax::NO_TABLE_ENTRY,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;
    // the collector is only ever installed together with the logger
    let _ = GLOBAL_ERROR_COLLECTOR.set(ErrorCollector::new());

    if let Some(logger) = try_get_global_logger() {
        logger.log_success(
            codes::success::SYSTEM_INITIALIZATION_COMPLETED,
            "Global logging system initialized",
        );
    }

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get()
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR.get()
}

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    if let Some(collector) = try_get_global_error_collector() {
        collector.record_file(&file_path);
    }
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(FileProcessingContext::new(file_path, file_id)));
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
}

/// Run `f` with a file context, restoring the previous one afterwards
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_file_context();
    set_file_context(file_path, file_id);
    let result = f();
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Deliver an event: tag it with the current file, log it, and collect it if it is an
/// error or warning raised inside a file context
pub fn dispatch_with_file_context(event: LogEvent) {
    let context = get_current_file_context();

    let event = match (&context, config::include_file_context()) {
        (Some(ctx), true) => event
            .with_context("file", &ctx.file_path.display().to_string())
            .with_context("file_id", &ctx.file_id.to_string()),
        _ => event,
    };

    let collect = event.is_error() || event.is_warning();
    let collector = try_get_global_error_collector();

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if let (true, Some(ctx), Some(collector)) = (collect, context, collector) {
        collector.record_event(&ctx.file_path, event);
    }
}

fn apply_context(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

/// Backend of `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, &config::clamp_message(message));
    if let Some(span) = span {
        event = event.with_span(span);
    }
    dispatch_with_file_context(apply_context(event, context));
}

/// Backend of `log_success!`. Timing fields are dropped unless performance events are on.
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let keep_timings = config::log_performance_events();
    let context = context
        .into_iter()
        .filter(|(key, _)| keep_timings || !key.ends_with("_ms"))
        .collect();
    dispatch_with_file_context(apply_context(LogEvent::success(code, message), context));
}

/// Backend of `log_info!`
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch_with_file_context(apply_context(LogEvent::info(message), context));
}

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(ErrorCollector::summary)
        .unwrap_or_default()
}

/// Print the collected diagnostics to stderr when cargo-style output is enabled
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }

    if let Some(collector) = try_get_global_error_collector() {
        let report = collector.render();
        if !report.is_empty() {
            eprint!("{}", report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context_management() {
        let file_path = PathBuf::from("program.py");

        clear_file_context();
        assert!(get_current_file_context().is_none());

        set_file_context(file_path.clone(), 1);
        assert_eq!(
            get_current_file_context().map(|c| c.file_path),
            Some(file_path)
        );

        clear_file_context();
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_with_file_context_restores_outer_context() {
        let outer = PathBuf::from("program.py");
        let inner = PathBuf::from("grammar.txt");

        let result = with_file_context(outer.clone(), 0, || {
            let nested = with_file_context(inner.clone(), 1, || {
                get_current_file_context().map(|c| c.file_path)
            });
            assert_eq!(nested, Some(inner.clone()));
            get_current_file_context().map(|c| c.file_path)
        });

        assert_eq!(result, Some(outer));
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_dispatch_without_global_logger_is_silent() {
        // must not panic whether or not another test installed the logger
        dispatch_with_file_context(LogEvent::debug("no logger"));
        log_info_with_context("still fine", vec![("k", "v")]);
        let _ = get_processing_summary();
    }
}
