//! Token vocabulary for the indentation-sensitive source language
//!
//! A token kind is identified on the wire by its name: reserved words use the word itself,
//! punctuation uses a `tk_` name, lexical categories use fixed names (`id`, `tk_integer`,
//! `tk_string`, `tk_newline`, `tk_indent`, `tk_dedent`) and the end-marker is `$`.
//! Grammar terminals are written with the same names.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const NEWLINE: &str = "tk_newline";
pub const INDENT: &str = "tk_indent";
pub const DEDENT: &str = "tk_dedent";
pub const IDENTIFIER: &str = "id";
pub const INTEGER: &str = "tk_integer";
pub const STRING: &str = "tk_string";
pub const END_MARKER: &str = "$";

/// Operators by source text. The lexer tries three, then two, then one character.
pub const OPERATORS: &[(&str, &str)] = &[
    // three characters
    ("**=", "tk_pow_assign"),
    ("//=", "tk_floordiv_assign"),
    ("<<=", "tk_lshift_assign"),
    (">>=", "tk_rshift_assign"),
    // two characters
    ("**", "tk_pow"),
    ("//", "tk_floordiv"),
    ("==", "tk_eq"),
    ("!=", "tk_neq"),
    ("<=", "tk_leq"),
    (">=", "tk_geq"),
    ("<<", "tk_lshift"),
    (">>", "tk_rshift"),
    ("->", "tk_arrow"),
    ("+=", "tk_plus_assign"),
    ("-=", "tk_minus_assign"),
    ("*=", "tk_mult_assign"),
    ("/=", "tk_div_assign"),
    ("%=", "tk_mod_assign"),
    ("&=", "tk_bitand_assign"),
    ("|=", "tk_bitor_assign"),
    ("^=", "tk_bitxor_assign"),
    // one character
    ("+", "tk_plus"),
    ("-", "tk_minus"),
    ("*", "tk_mult"),
    ("/", "tk_div"),
    ("%", "tk_mod"),
    ("=", "tk_assign"),
    ("<", "tk_lt"),
    (">", "tk_gt"),
    ("&", "tk_bitand"),
    ("|", "tk_bitor"),
    ("^", "tk_bitxor"),
    ("~", "tk_bitnot"),
];

/// Characters that start an operator. `!` has no single-character form.
pub const OPERATOR_CHARS: &[char] = &[
    '+', '-', '*', '/', '%', '=', '<', '>', '&', '|', '^', '~', '!',
];

pub const DELIMITERS: &[(char, &str)] = &[
    ('(', "tk_lparen"),
    (')', "tk_rparen"),
    ('[', "tk_lbracket"),
    (']', "tk_rbracket"),
    ('{', "tk_lbrace"),
    ('}', "tk_rbrace"),
    (',', "tk_comma"),
    (':', "tk_colon"),
    ('.', "tk_dot"),
    (';', "tk_semicolon"),
];

pub const RESERVED_WORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Kind of a token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Newline,
    Indent,
    Dedent,
    Identifier,
    Integer,
    Str,
    EndMarker,
    /// Reserved word; the name is the word itself
    Keyword(&'static str),
    /// Operator, by its `tk_` name
    Operator(&'static str),
    /// Delimiter, by its `tk_` name
    Delimiter(&'static str),
    /// A kind read back from a token file that is not part of the vocabulary
    Other(String),
}

impl TokenKind {
    /// Name used in token files and grammar terminals
    pub fn as_str(&self) -> &str {
        match self {
            Self::Newline => NEWLINE,
            Self::Indent => INDENT,
            Self::Dedent => DEDENT,
            Self::Identifier => IDENTIFIER,
            Self::Integer => INTEGER,
            Self::Str => STRING,
            Self::EndMarker => END_MARKER,
            Self::Keyword(word) => *word,
            Self::Operator(name) | Self::Delimiter(name) => *name,
            Self::Other(name) => name.as_str(),
        }
    }

    /// Resolve a kind from its name; unknown names are kept verbatim
    pub fn from_name(name: &str) -> Self {
        match name {
            NEWLINE => Self::Newline,
            INDENT => Self::Indent,
            DEDENT => Self::Dedent,
            IDENTIFIER => Self::Identifier,
            INTEGER => Self::Integer,
            STRING => Self::Str,
            END_MARKER => Self::EndMarker,
            _ => {
                if let Some(word) = RESERVED_WORDS.iter().find(|w| **w == name) {
                    Self::Keyword(*word)
                } else if let Some((_, op)) = OPERATORS.iter().find(|(_, n)| *n == name) {
                    Self::Operator(*op)
                } else if let Some((_, delim)) = DELIMITERS.iter().find(|(_, n)| *n == name) {
                    Self::Delimiter(*delim)
                } else {
                    Self::Other(name.to_string())
                }
            }
        }
    }

    /// Whether tokens of this kind carry a lexeme
    pub fn has_lexeme(&self) -> bool {
        matches!(self, Self::Identifier | Self::Integer | Self::Str)
    }

    pub fn class(&self) -> TokenClass {
        match self {
            Self::Newline | Self::Indent | Self::Dedent => TokenClass::Layout,
            Self::Keyword(_) => TokenClass::Keyword,
            Self::Operator(_) => TokenClass::Operator,
            Self::Delimiter(_) => TokenClass::Delimiter,
            Self::Integer | Self::Str => TokenClass::Literal,
            Self::Identifier => TokenClass::Identifier,
            Self::EndMarker => TokenClass::EndMarker,
            Self::Other(_) => TokenClass::Unknown,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TokenKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Token classification, used for metrics and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TokenClass {
    /// Newline, indent and dedent
    Layout,
    Keyword,
    Operator,
    Delimiter,
    Literal,
    Identifier,
    EndMarker,
    Unknown,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Keyword => "keyword",
            Self::Operator => "operator",
            Self::Delimiter => "delimiter",
            Self::Literal => "literal",
            Self::Identifier => "identifier",
            Self::EndMarker => "end_marker",
            Self::Unknown => "unknown",
        }
    }
}

/// A token: kind plus lexeme for identifiers, integers and strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lexeme: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind) -> Self {
        Self { kind, lexeme: None }
    }

    pub fn with_lexeme(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: Some(lexeme.into()),
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::with_lexeme(TokenKind::Identifier, name)
    }

    pub fn integer(digits: impl Into<String>) -> Self {
        Self::with_lexeme(TokenKind::Integer, digits)
    }

    pub fn string(content: impl Into<String>) -> Self {
        Self::with_lexeme(TokenKind::Str, content)
    }

    pub fn newline() -> Self {
        Self::new(TokenKind::Newline)
    }

    pub fn indent() -> Self {
        Self::new(TokenKind::Indent)
    }

    pub fn dedent() -> Self {
        Self::new(TokenKind::Dedent)
    }

    pub fn end_marker() -> Self {
        Self::with_lexeme(TokenKind::EndMarker, END_MARKER)
    }

    pub fn kind_name(&self) -> &str {
        self.kind.as_str()
    }

    pub fn lexeme(&self) -> Option<&str> {
        self.lexeme.as_deref()
    }

    /// Text shown when the token is reported: the lexeme, or the kind name
    pub fn display_text(&self) -> &str {
        self.lexeme.as_deref().unwrap_or_else(|| self.kind.as_str())
    }

    pub fn is_end_marker(&self) -> bool {
        self.kind == TokenKind::EndMarker
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Newline
    }

    pub fn token_class(&self) -> TokenClass {
        self.kind.class()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lexeme {
            Some(lexeme) if self.kind.has_lexeme() => write!(f, "{}({:?})", self.kind, lexeme),
            _ => write!(f, "{}", self.kind),
        }
    }
}

// === CLASSIFICATION FUNCTIONS ===

pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

/// Classify a scanned word as a reserved word or an identifier
pub fn classify_word(word: &str) -> Token {
    match RESERVED_WORDS.iter().find(|w| **w == word) {
        Some(reserved) => Token::new(TokenKind::Keyword(*reserved)),
        None => Token::identifier(word),
    }
}

pub fn is_operator_char(ch: char) -> bool {
    OPERATOR_CHARS.contains(&ch)
}

/// Map exact operator text to its kind name
pub fn classify_operator_symbol(symbol: &str) -> Option<&'static str> {
    OPERATORS
        .iter()
        .find(|(text, _)| *text == symbol)
        .map(|(_, name)| *name)
}

/// Longest operator at the start of `input`, trying 3, 2 then 1 characters.
/// Returns the operator text and kind name.
pub fn match_operator(input: &str) -> Option<(&'static str, &'static str)> {
    for width in (1..=3).rev() {
        let candidate: String = input.chars().take(width).collect();
        if candidate.chars().count() < width {
            continue;
        }
        if let Some((text, name)) = OPERATORS.iter().find(|(text, _)| *text == candidate) {
            return Some((*text, *name));
        }
    }
    None
}

pub fn is_delimiter(ch: char) -> bool {
    DELIMITERS.iter().any(|(c, _)| *c == ch)
}

pub fn classify_delimiter(ch: char) -> Option<&'static str> {
    DELIMITERS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, name)| *name)
}
