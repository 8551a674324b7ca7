//! Runtime preferences
//!
//! Everything here changes what gets logged or collected, never what is accepted; the hard
//! limits live in `compile_time`. Each value is read from, in order of precedence, a TOML
//! file passed with `--config`, a `PYLL_*` environment variable, and the built-in default.

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Environment value for `name`, or `default` when unset or unparsable
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    pub enable_performance_logging: bool,
    /// An empty source file yields no tokens instead of an error
    pub allow_empty_source: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
            allow_empty_source: env_or(env_vars::ALLOW_EMPTY_SOURCE, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Per-kind token counts in `LexicalMetrics`
    pub collect_detailed_metrics: bool,
    /// Debug event for every INDENT and DEDENT
    pub log_indentation_changes: bool,
    pub include_position_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            log_indentation_changes: env_or(env_vars::LEXICAL_LOG_INDENTATION, false),
            include_position_in_errors: env_or(env_vars::LEXICAL_INCLUDE_POSITIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarPreferences {
    /// Report undeclared upper-case symbols as W064
    pub warn_on_undefined_non_terminals: bool,
    /// Log how many passes the FIRST and FOLLOW fixed points took
    pub log_set_iterations: bool,
}

impl Default for GrammarPreferences {
    fn default() -> Self {
        Self {
            warn_on_undefined_non_terminals: env_or(env_vars::GRAMMAR_WARN_UNDEFINED, true),
            log_set_iterations: env_or(env_vars::GRAMMAR_LOG_ITERATIONS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Debug event for every stack step
    pub trace_steps: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            trace_steps: env_or(env_vars::PARSER_TRACE_STEPS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// JSON lines on stderr instead of the plain console format
    pub use_structured_logging: bool,
    pub enable_console_logging: bool,
    pub min_log_level: LogLevel,
    /// Keep `*_ms` timing fields on success events
    pub log_performance_events: bool,
    /// Print the collected diagnostics after a failed run
    pub enable_cargo_style_output: bool,
    /// Tag events with the file being processed
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, true),
            min_log_level: env_or(env_vars::LOGGING_MIN_LEVEL, LogLevel::Warning),
            log_performance_events: env_or(env_vars::LOGGING_LOG_PERFORMANCE, true),
            enable_cargo_style_output: env_or(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_or(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub grammar: GrammarPreferences,
    pub parser: ParserPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Missing tables and keys keep their defaults. `origin` names the text in errors.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::from_toml_str(&content, &origin)
    }
}

pub mod env_vars {
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "PYLL_ENABLE_PERFORMANCE_LOGGING";
    pub const ALLOW_EMPTY_SOURCE: &str = "PYLL_ALLOW_EMPTY_SOURCE";

    pub const LEXICAL_DETAILED_METRICS: &str = "PYLL_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_LOG_INDENTATION: &str = "PYLL_LEXICAL_LOG_INDENTATION";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "PYLL_LEXICAL_INCLUDE_POSITIONS";

    pub const GRAMMAR_WARN_UNDEFINED: &str = "PYLL_GRAMMAR_WARN_UNDEFINED";
    pub const GRAMMAR_LOG_ITERATIONS: &str = "PYLL_GRAMMAR_LOG_ITERATIONS";

    pub const PARSER_TRACE_STEPS: &str = "PYLL_PARSER_TRACE_STEPS";

    pub const LOGGING_USE_STRUCTURED: &str = "PYLL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "PYLL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "PYLL_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "PYLL_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "PYLL_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "PYLL_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_log_level_names() {
        assert_eq!("ERROR".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("2".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = RuntimeConfig::from_toml_str(
            "[parser]\ntrace_steps = true\n\n[logging]\nmin_log_level = \"warn\"\n",
            "inline",
        )
        .unwrap();

        assert!(config.parser.trace_steps);
        assert_eq!(config.logging.min_log_level, LogLevel::Warning);

        let config =
            RuntimeConfig::from_toml_str("[logging]\nmin_log_level = \"debug\"\n", "inline")
                .unwrap();
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml_reports_origin() {
        let result = RuntimeConfig::from_toml_str("[parser\n", "broken.toml");
        assert_matches!(result, Err(ConfigError::Parse { ref path, .. }) if path == "broken.toml");

        let result = RuntimeConfig::from_toml_str("[logging]\nmin_log_level = \"loud\"\n", "x");
        assert_matches!(result, Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pyll.toml");
        fs::write(&path, "[grammar]\nlog_set_iterations = true\n").unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert!(config.grammar.log_set_iterations);

        let missing = RuntimeConfig::load(&dir.path().join("absent.toml"));
        assert_matches!(missing, Err(ConfigError::Io { .. }));
    }
}
