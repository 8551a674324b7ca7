//! Diagnostic codes and their metadata
//!
//! Every code the front end emits is declared here, grouped by stage, and described by one
//! row of the static registry table below. Codes are `E` (error), `W` (warning), `I`
//! (success) or `ERR` (internal).

use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Registry row for one code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const MALFORMED_INTEGER: Code = Code::new("E022");
    pub const UNTERMINATED_BLOCK_COMMENT: Code = Code::new("E023");
    pub const MIXED_INDENTATION: Code = Code::new("E024");
    pub const INDENTATION_MISMATCH: Code = Code::new("E025");
    pub const INDENTATION_TOO_DEEP: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const STRING_TOO_LARGE: Code = Code::new("E028");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E029");
}

pub mod syntax {
    use super::Code;

    pub const TERMINAL_MISMATCH: Code = Code::new("E040");
    pub const NO_TABLE_ENTRY: Code = Code::new("E041");
    pub const UNKNOWN_STACK_SYMBOL: Code = Code::new("E042");
    pub const STACK_DEPTH_EXCEEDED: Code = Code::new("E043");
    pub const STEP_LIMIT_EXCEEDED: Code = Code::new("E044");
}

pub mod grammar {
    use super::Code;

    pub const MISSING_INPUT: Code = Code::new("E060");
    pub const RULE_BEFORE_HEADER: Code = Code::new("E061");
    pub const MALFORMED_HEADER: Code = Code::new("E062");
    pub const LL1_CONFLICT: Code = Code::new("E063");
    pub const UNDEFINED_NON_TERMINAL: Code = Code::new("W064");
    pub const GRAMMAR_TOO_LARGE: Code = Code::new("E065");
    pub const SETS_DID_NOT_CONVERGE: Code = Code::new("E066");
}

/// Token file format
pub mod interchange {
    use super::Code;

    pub const MALFORMED_TOKEN_LINE: Code = Code::new("E070");
    pub const INVALID_TOKEN_POSITION: Code = Code::new("E071");
}

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");

    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const TOKEN_FILE_WRITTEN: Code = Code::new("I021");
    pub const TOKEN_FILE_READ: Code = Code::new("I022");

    pub const PARSE_COMPLETE: Code = Code::new("I040");

    pub const GRAMMAR_COMPILED: Code = Code::new("I060");
    pub const PARSE_TABLE_BUILT: Code = Code::new("I061");

    pub const PIPELINE_COMPLETE: Code = Code::new("I090");
}

const fn fatal(
    code: &'static str,
    category: &'static str,
    severity: Severity,
    description: &'static str,
    recommended_action: &'static str,
) -> ErrorMetadata {
    ErrorMetadata {
        code,
        category,
        severity,
        recoverable: false,
        requires_halt: true,
        description,
        recommended_action,
    }
}

const fn advisory(
    code: &'static str,
    category: &'static str,
    description: &'static str,
    recommended_action: &'static str,
) -> ErrorMetadata {
    ErrorMetadata {
        code,
        category,
        severity: Severity::Low,
        recoverable: true,
        requires_halt: false,
        description,
        recommended_action,
    }
}

const fn completed(code: &'static str, description: &'static str) -> ErrorMetadata {
    advisory(code, "Success", description, "No action required")
}

use Severity::{Critical, High, Low, Medium};

static REGISTRY_TABLE: &[ErrorMetadata] = &[
    fatal("ERR001", "System", Critical,
        "Critical internal system error",
        "File a bug report with the input that triggered it"),
    fatal("ERR002", "System", Critical,
        "System initialization failure",
        "Check the runtime configuration and environment variables"),

    fatal("E005", "FileProcessing", Medium,
        "File not found at specified path",
        "Check file path and ensure file exists"),
    fatal("E007", "FileProcessing", Medium,
        "File exceeds maximum size limit",
        "Reduce file size or rebuild with a larger profile limit"),
    fatal("E008", "FileProcessing", Medium,
        "File is empty when content expected",
        "Provide a file with content"),
    fatal("E009", "FileProcessing", High,
        "Permission denied reading file",
        "Check file permissions"),
    fatal("E010", "FileProcessing", Medium,
        "File is not valid UTF-8",
        "Convert the file to UTF-8"),
    fatal("E011", "FileProcessing", High,
        "I/O error while accessing file",
        "Check disk health and file accessibility"),
    fatal("E012", "FileProcessing", Medium,
        "Invalid file path",
        "Provide a path to a regular file"),
    fatal("E013", "FileProcessing", Medium,
        "File exceeds maximum line count",
        "Split the input or rebuild with a larger profile limit"),

    fatal("E020", "Lexical", High,
        "Unrecognized character in source",
        "Remove the character or place it inside a string or comment"),
    fatal("E021", "Lexical", High,
        "String literal is missing its closing quote",
        "Add the matching closing quote"),
    fatal("E022", "Lexical", High,
        "Integer literal is immediately followed by a letter or underscore",
        "Separate the number from the identifier or rename the identifier"),
    fatal("E023", "Lexical", High,
        "Triple-quoted block comment is never closed",
        "Close the block comment with the same three quotes"),
    fatal("E024", "Lexical", High,
        "Leading whitespace mixes tabs and spaces",
        "Indent the line using only spaces or only tabs"),
    fatal("E025", "Lexical", High,
        "Dedent does not match any outer indentation level",
        "Align the line with an enclosing block"),
    fatal("E026", "Lexical", Medium,
        "Indentation nesting exceeds the configured maximum",
        "Flatten deeply nested blocks"),
    fatal("E027", "Lexical", Medium,
        "Token count exceeds the configured maximum",
        "Split the source into smaller files"),
    fatal("E028", "Lexical", Medium,
        "String literal exceeds the configured maximum size",
        "Shorten the string literal"),
    fatal("E029", "Lexical", Low,
        "Identifier exceeds the configured maximum length",
        "Use a shorter identifier"),

    fatal("E040", "Syntax", High,
        "Token does not match the terminal on top of the parser stack",
        "Check the token against the grammar rule being expanded"),
    fatal("E041", "Syntax", High,
        "No parse table entry for the current rule and token",
        "Use one of the expected tokens listed in the message"),
    fatal("E042", "Syntax", High,
        "Parser stack holds a symbol that is neither terminal nor non-terminal",
        "Declare the referenced rule in the grammar"),
    fatal("E043", "Syntax", Critical,
        "Parser stack depth exceeds the configured maximum",
        "Check the grammar for runaway expansions"),
    fatal("E044", "Syntax", Critical,
        "Parser step count exceeds the configured maximum",
        "Check the grammar for cycles that consume no input"),

    fatal("E060", "Grammar", High,
        "Grammar source is missing or contains no rules",
        "Provide a grammar file with at least one 'LHS -> RHS' rule"),
    fatal("E061", "Grammar", High,
        "Alternative line appears before any rule header",
        "Start the grammar with a 'LHS -> RHS' header"),
    fatal("E062", "Grammar", High,
        "Rule header has a missing or malformed left-hand side",
        "Write headers as a single symbol followed by '->'"),
    fatal("E063", "Grammar", Critical,
        "Grammar is not LL(1): two productions share a prediction terminal",
        "Left-factor the conflicting alternatives"),
    advisory("W064", "Grammar",
        "Upper-case symbol is referenced but never declared",
        "Add a rule for the symbol or rename it to a terminal"),
    fatal("E065", "Grammar", Medium,
        "Grammar exceeds the configured size limits",
        "Reduce the number of rules or symbols per production"),
    fatal("E066", "Grammar", Critical,
        "FIRST/FOLLOW computation did not reach a fixed point",
        "File a bug report with the grammar"),

    fatal("E070", "Interchange", High,
        "Token line is not in <KIND,LINE,COL> or <KIND,LEXEME,LINE,COL> form",
        "Regenerate the token file with the lexer"),
    fatal("E071", "Interchange", High,
        "Token line or column is not a number",
        "Regenerate the token file with the lexer"),

    completed("I001", "Operation completed successfully"),
    completed("I004", "System initialization completed"),
    completed("I006", "File processing completed"),
    completed("I020", "Tokenization completed"),
    completed("I021", "Token file written"),
    completed("I022", "Token file read"),
    completed("I040", "Parse completed without errors"),
    completed("I060", "Grammar compiled"),
    completed("I061", "Parse table built"),
    completed("I090", "Pipeline completed"),
];

static REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

fn registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    REGISTRY.get_or_init(|| REGISTRY_TABLE.iter().map(|row| (row.code, row)).collect())
}

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    registry().get(code).copied()
}

/// Unknown codes default to `Medium`
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code).map_or(true, |m| m.recoverable)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code).map_or(false, |m| m.requires_halt)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code).map_or("Unknown error", |m| m.description)
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code).map_or("No specific action available", |m| m.recommended_action)
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code).map_or("Unknown", |m| m.category)
}
