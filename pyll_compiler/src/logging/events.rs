//! Log events emitted by the lexer, grammar compiler and parser

use super::codes::{self, Code};
use crate::utils::Span;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

/// Ordered from most to least severe; a logger with minimum level `L` emits every event
/// whose level is `<= L`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    #[serde(alias = "warn")]
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Accepts names in any case and the numeric levels `0`-`3`
impl FromStr for LogLevel {
    type Err = String;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.to_lowercase().as_str() {
            "error" | "0" => Ok(LogLevel::Error),
            "warning" | "warn" | "1" => Ok(LogLevel::Warning),
            "info" | "2" => Ok(LogLevel::Info),
            "debug" | "3" => Ok(LogLevel::Debug),
            other => Err(format!("Unknown log level '{}'", other)),
        }
    }
}

const GENERIC_WARNING: Code = Code::new("W000");
const GENERIC_INFO: Code = Code::new("I000");
const GENERIC_DEBUG: Code = Code::new("D000");

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct JsonSpan {
    start_line: u32,
    start_column: u32,
    end_line: u32,
    end_column: u32,
}

#[derive(Serialize)]
struct JsonErrorMetadata {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
}

/// Borrowed view serialized by `format_json`
#[derive(Serialize)]
struct JsonEvent<'a> {
    timestamp: String,
    level: &'static str,
    code: &'static str,
    message: &'a str,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_metadata: Option<JsonErrorMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<JsonSpan>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    context: &'a BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, GENERIC_WARNING, message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, GENERIC_INFO, message)
    }

    /// Success events are info events carrying an `I` code
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, GENERIC_DEBUG, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.code.as_str())
    }

    /// `[LEVEL] CODE - message at L:C`
    pub fn format(&self) -> String {
        let mut line = format!(
            "[{}] {} - {}",
            self.level.as_str(),
            self.code,
            self.message
        );
        if let Some(span) = &self.span {
            let _ = write!(line, " at {}:{}", span.start().line, span.start().column);
        }
        line
    }

    /// Multi-line form with registry metadata and context
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();
        let _ = write!(
            output,
            "\n  Category: {}\n  Severity: {}",
            self.category(),
            self.severity()
        );

        if self.is_error() {
            let _ = write!(
                output,
                "\n  Recoverable: {}\n  Requires halt: {}",
                self.is_recoverable(),
                self.requires_halt()
            );
        }

        if codes::get_error_metadata(self.code.as_str()).is_some() {
            let _ = write!(output, "\n  Description: {}", self.description());
            let _ = write!(output, "\n  Recommended action: {}", self.recommended_action());
        }

        if !self.context.is_empty() {
            output.push_str("\n  Context:");
            for (key, value) in &self.context {
                let _ = write!(output, "\n    {}: {}", key, value);
            }
        }

        output
    }

    /// One JSON object, RFC 3339 timestamp with milliseconds
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let view = JsonEvent {
            timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            level: self.level.as_str(),
            code: self.code.as_str(),
            message: &self.message,
            category: self.category(),
            severity: self.severity(),
            error_metadata: self.is_error().then(|| JsonErrorMetadata {
                recoverable: self.is_recoverable(),
                requires_halt: self.requires_halt(),
                description: self.description(),
                recommended_action: self.recommended_action(),
            }),
            span: self.span.map(|span| JsonSpan {
                start_line: span.start().line,
                start_column: span.start().column,
                end_line: span.end().line,
                end_column: span.end().column,
            }),
            context: &self.context,
        };

        serde_json::to_string(&view)
    }
}
