//! Line-oriented token file format
//!
//! One token per line, `<KIND,LINE,COL>` or `<KIND,LEXEME,LINE,COL>`. Newlines, carriage
//! returns and backslashes inside lexemes are written as `\n`, `\r` and `\\`. The reader
//! takes the kind up to the first comma and the line and column from the right, so lexemes
//! may contain commas. Reading always appends an end-marker token.

use super::token::{Token, TokenKind};
use super::token_stream::SpannedToken;
use crate::logging::codes;
use crate::utils::{Position, Span};
use crate::{log_debug, log_error};
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenFormatError {
    #[error("Malformed token on line {line_number}: {content}")]
    MalformedLine { line_number: usize, content: String },

    #[error("Invalid position '{value}' on line {line_number}")]
    InvalidPosition { line_number: usize, value: String },
}

impl TokenFormatError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::MalformedLine { .. } => codes::interchange::MALFORMED_TOKEN_LINE,
            Self::InvalidPosition { .. } => codes::interchange::INVALID_TOKEN_POSITION,
        }
    }

    /// Line of the token file the error refers to
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedLine { line_number, .. } | Self::InvalidPosition { line_number, .. } => {
                *line_number
            }
        }
    }
}

fn escape_lexeme(lexeme: &str) -> String {
    let mut escaped = String::with_capacity(lexeme.len());
    for ch in lexeme.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn unescape_lexeme(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Render one token in interchange form
pub fn format_token(token: &SpannedToken) -> String {
    let start = token.span.start;
    match token.value.lexeme() {
        Some(lexeme) if !token.value.is_end_marker() => format!(
            "<{},{},{},{}>",
            token.value.kind_name(),
            escape_lexeme(lexeme),
            start.line,
            start.column
        ),
        _ => format!(
            "<{},{},{}>",
            token.value.kind_name(),
            start.line,
            start.column
        ),
    }
}

/// Render a token sequence, one line per token
pub fn render_tokens(tokens: &[SpannedToken]) -> String {
    let mut output = String::new();
    for token in tokens {
        output.push_str(&format_token(token));
        output.push('\n');
    }
    output
}

pub fn write_tokens<W: Write>(writer: &mut W, tokens: &[SpannedToken]) -> io::Result<()> {
    for token in tokens {
        writeln!(writer, "{}", format_token(token))?;
    }
    writer.flush()
}

fn parse_position(value: &str, line_number: usize) -> Result<u32, TokenFormatError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| TokenFormatError::InvalidPosition {
            line_number,
            value: value.to_string(),
        })
}

fn parse_line(content: &str, line_number: usize) -> Result<SpannedToken, TokenFormatError> {
    let malformed = || TokenFormatError::MalformedLine {
        line_number,
        content: content.to_string(),
    };

    let inner = content
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(malformed)?;

    let (kind, rest) = inner.split_once(',').ok_or_else(malformed)?;
    let kind = kind.trim();
    if kind.is_empty() {
        return Err(malformed());
    }

    let mut parts = rest.rsplitn(3, ',');
    let column = parts.next().ok_or_else(malformed)?;
    let line = parts.next().ok_or_else(malformed)?;
    let lexeme = parts.next();

    let position = Position::at(
        parse_position(line, line_number)?,
        parse_position(column, line_number)?,
    );

    let kind = TokenKind::from_name(kind);
    let token = match lexeme {
        Some(raw) => Token::with_lexeme(kind, unescape_lexeme(raw)),
        None => Token::new(kind),
    };

    Ok(SpannedToken::new(token, Span::empty(position)))
}

/// Parse a token file. The returned sequence always ends with an end-marker positioned at
/// the last token read, or at 0:0 when the input holds no tokens.
pub fn read_tokens(content: &str) -> Result<Vec<SpannedToken>, TokenFormatError> {
    let mut tokens = Vec::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line, index + 1) {
            Ok(token) => tokens.push(token),
            Err(err) => {
                log_error!(err.error_code(), "Unreadable token line",
                    "line_number" => err.line_number(),
                    "content" => line);
                return Err(err);
            }
        }
    }

    let end_position = tokens
        .last()
        .map(|t: &SpannedToken| t.span.start)
        .unwrap_or_else(|| Position::at(0, 0));
    tokens.push(SpannedToken::new(
        Token::end_marker(),
        Span::empty(end_position),
    ));

    log_debug!("Token file parsed",
        "tokens" => tokens.len(),
        "end_line" => end_position.line,
        "end_column" => end_position.column);

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn at(token: Token, line: u32, column: u32) -> SpannedToken {
        SpannedToken::new(token, Span::empty(Position::at(line, column)))
    }

    #[test]
    fn test_format_with_and_without_lexeme() {
        assert_eq!(format_token(&at(Token::identifier("x"), 1, 1)), "<id,x,1,1>");
        assert_eq!(format_token(&at(Token::newline(), 1, 6)), "<tk_newline,1,6>");
        assert_eq!(
            format_token(&at(Token::new(TokenKind::Keyword("if")), 3, 5)),
            "<if,3,5>"
        );
    }

    #[test]
    fn test_string_lexeme_escaping() {
        let token = at(Token::string("a\nb\\c"), 2, 4);
        let line = format_token(&token);
        assert_eq!(line, "<tk_string,a\\nb\\\\c,2,4>");

        let read = read_tokens(&line).unwrap();
        assert_eq!(read[0].value.lexeme(), Some("a\nb\\c"));
    }

    #[test]
    fn test_lexeme_with_commas() {
        let read = read_tokens("<tk_string,a, b,,c,7,12>\n").unwrap();
        assert_eq!(read[0].value.kind, TokenKind::Str);
        assert_eq!(read[0].value.lexeme(), Some("a, b,,c"));
        assert_eq!(read[0].span.start, Position::at(7, 12));
    }

    #[test]
    fn test_end_marker_appended_at_last_position() {
        let read = read_tokens("<id,x,1,1>\n<tk_assign,1,3>\n\n<tk_newline,1,6>\n").unwrap();
        assert_eq!(read.len(), 4);
        let end = &read[3];
        assert!(end.value.is_end_marker());
        assert_eq!(end.value.lexeme(), Some("$"));
        assert_eq!(end.span.start, Position::at(1, 6));
    }

    #[test]
    fn test_empty_input_yields_only_end_marker() {
        let read = read_tokens("").unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].span.start, Position::at(0, 0));
    }

    #[test]
    fn test_malformed_lines() {
        assert_matches!(
            read_tokens("<id,x,1,1>\nid,x,1,1\n"),
            Err(TokenFormatError::MalformedLine { line_number: 2, .. })
        );
        assert_matches!(
            read_tokens("<tk_newline>"),
            Err(TokenFormatError::MalformedLine { line_number: 1, .. })
        );
        assert_matches!(
            read_tokens("<tk_newline,one,1>"),
            Err(TokenFormatError::InvalidPosition { line_number: 1, .. })
        );
    }

    #[test]
    fn test_written_stream_reads_back() {
        let tokens = vec![
            at(Token::new(TokenKind::Keyword("while")), 1, 1),
            at(Token::identifier("n"), 1, 7),
            at(Token::new(TokenKind::Delimiter("tk_colon")), 1, 8),
            at(Token::newline(), 1, 9),
            at(Token::indent(), 2, 5),
            at(Token::integer("10"), 2, 5),
        ];

        let mut buffer = Vec::new();
        write_tokens(&mut buffer, &tokens).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, render_tokens(&tokens));

        let read = read_tokens(&text).unwrap();
        assert_eq!(read.len(), tokens.len() + 1);
        for (original, parsed) in tokens.iter().zip(&read) {
            assert_eq!(original.value, parsed.value);
            assert_eq!(original.span.start, parsed.span.start);
        }
    }
}
