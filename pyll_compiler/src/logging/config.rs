//! Logging preferences: installed once at startup, read by every log call

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install the preferences. Only the first call takes effect; before it, defaults
/// (environment-derived) apply.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime logging preferences already initialized".to_string())
}

fn with_preferences<T>(read: impl FnOnce(&LoggingPreferences) -> T) -> T {
    match PREFERENCES.get() {
        Some(preferences) => read(preferences),
        None => read(&LoggingPreferences::default()),
    }
}

pub fn get_min_log_level() -> LogLevel {
    with_preferences(|p| p.min_log_level)
}

pub fn use_structured_logging() -> bool {
    with_preferences(|p| p.use_structured_logging)
}

pub fn use_console_logging() -> bool {
    with_preferences(|p| p.enable_console_logging)
}

pub fn log_performance_events() -> bool {
    with_preferences(|p| p.log_performance_events)
}

pub fn use_cargo_style_output() -> bool {
    with_preferences(|p| p.enable_cargo_style_output)
}

pub fn include_file_context() -> bool {
    with_preferences(|p| p.include_file_context)
}

/// Cut a message to `MAX_LOG_MESSAGE_LENGTH` bytes on a char boundary
pub fn clamp_message(message: &str) -> String {
    if message.len() <= MAX_LOG_MESSAGE_LENGTH {
        return message.to_string();
    }

    let end = (0..=MAX_LOG_MESSAGE_LENGTH)
        .rev()
        .find(|&i| message.is_char_boundary(i))
        .unwrap_or(0);
    format!("{}...", &message[..end])
}

/// Sanity checks on the generated limits
pub fn validate_config() -> Result<(), String> {
    if !(100..=100_000).contains(&LOG_BUFFER_SIZE) {
        return Err(format!(
            "Log buffer size {} outside 100..=100000",
            LOG_BUFFER_SIZE
        ));
    }

    if MAX_LOG_EVENTS_PER_FILE > MAX_ERROR_COLLECTION {
        return Err(format!(
            "Per-file event limit {} exceeds the collection limit {}",
            MAX_LOG_EVENTS_PER_FILE, MAX_ERROR_COLLECTION
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_limits_are_valid() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_clamp_message() {
        assert_eq!(clamp_message("short"), "short");

        let long = "é".repeat(MAX_LOG_MESSAGE_LENGTH);
        let clamped = clamp_message(&long);
        assert!(clamped.ends_with("..."));
        assert!(clamped.len() <= MAX_LOG_MESSAGE_LENGTH + 3);
    }
}
