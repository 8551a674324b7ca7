//! Logging service and logger backends
//!
//! Console and structured output go to stderr; stdout belongs to token listings, grammar
//! reports and the parse result line.

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::config::compile_time::logging::LOG_BUFFER_SIZE;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level filter in front of one or more loggers
pub struct LoggingService {
    sinks: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self {
            sinks: vec![logger],
            min_level,
        }
    }

    /// Service matching the runtime logging preferences
    pub fn from_preferences() -> Self {
        let min_level = config::get_min_log_level();
        let mut sinks: Vec<Arc<dyn Logger>> = Vec::new();

        if config::use_console_logging() {
            if config::use_structured_logging() {
                sinks.push(Arc::new(StructuredLogger));
            } else {
                sinks.push(Arc::new(ConsoleLogger));
            }
        }

        Self { sinks, min_level }
    }

    pub fn add_sink(&mut self, logger: Arc<dyn Logger>) {
        self.sinks.push(logger);
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if !self.should_log(event.level) {
            return;
        }
        for sink in &self.sinks {
            sink.log(&event);
        }
    }

    pub fn log_error(&self, code: Code, message: &str) {
        self.log_event(LogEvent::error(code, message));
    }

    pub fn log_success(&self, code: Code, message: &str) {
        self.log_event(LogEvent::success(code, message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_warning_with_code(&self, code: Code, message: &str) {
        self.log_event(LogEvent::warning_with_code(code, message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// One `[LEVEL] CODE - message` line per event
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        eprintln!("{}", event.format());
    }
}

/// One JSON object per line
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", event.format()),
        }
    }
}

/// Keeps the most recent events in memory. Used by tests.
pub struct MemoryLogger {
    events: Mutex<VecDeque<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().iter().cloned().collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn errors(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.is_error())
            .cloned()
            .collect()
    }

    /// Whether an event with this code was recorded at this level
    pub fn has_event(&self, level: LogLevel, code: Code) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.level == level && e.code == code)
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.events.lock().unwrap();
        while events.len() >= LOG_BUFFER_SIZE {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Lexing program.py"));
        logger.log(&LogEvent::error(
            codes::lexical::INVALID_CHARACTER,
            "Invalid character",
        ));

        assert_eq!(logger.event_count(), 2);
        assert_eq!(logger.errors().len(), 1);
        assert!(logger.has_event(LogLevel::Error, codes::lexical::INVALID_CHARACTER));

        logger.clear();
        assert!(logger.events().is_empty());
    }

    #[test]
    fn test_memory_logger_keeps_latest_events() {
        let logger = MemoryLogger::new();
        for i in 0..LOG_BUFFER_SIZE + 3 {
            logger.log(&LogEvent::info(&format!("event {}", i)));
        }

        let events = logger.events();
        assert_eq!(events.len(), LOG_BUFFER_SIZE);
        assert_eq!(events[0].message, "event 3");
    }

    #[test]
    fn test_service_filters_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);

        service.log_debug("Debug message");
        service.log_info("Info message");
        service.log_warning_with_code(codes::grammar::UNDEFINED_NON_TERMINAL, "Undeclared");
        service.log_error(codes::syntax::NO_TABLE_ENTRY, "No entry");

        assert_eq!(memory.event_count(), 2);
        assert!(memory.has_event(LogLevel::Error, codes::syntax::NO_TABLE_ENTRY));
    }

    #[test]
    fn test_service_fans_out_to_every_sink() {
        let first = Arc::new(MemoryLogger::new());
        let second = Arc::new(MemoryLogger::new());
        let mut service = LoggingService::new(first.clone(), LogLevel::Info);
        service.add_sink(second.clone());

        service.log_success(codes::success::GRAMMAR_COMPILED, "Grammar compiled");

        assert!(first.has_event(LogLevel::Info, codes::success::GRAMMAR_COMPILED));
        assert_eq!(second.event_count(), 1);
    }
}
