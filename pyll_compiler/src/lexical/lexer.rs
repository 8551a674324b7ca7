//! Scanner core: source text to spanned tokens
//!
//! A `Lexer` is built per source text and consumed by a single run. Scanning halts at the
//! first error; tokens produced before it are kept so they can still be written out.

use super::error::LexerError;
use super::indentation::{measure_indentation, IndentChange, IndentStack};
use crate::config::compile_time::lexical::*;
use crate::tokens::token::{
    classify_delimiter, classify_word, is_operator_char, match_operator, Token, TokenKind,
};
use crate::tokens::SpannedToken;
use crate::utils::{Position, Span};

/// Tokens produced by a run, plus the error that stopped it (if any)
#[derive(Debug, Clone)]
pub struct LexOutput {
    pub tokens: Vec<SpannedToken>,
    pub error: Option<LexerError>,
}

impl LexOutput {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<SpannedToken>, LexerError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.tokens),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    position: Position,
    tokens: Vec<SpannedToken>,
    indents: IndentStack,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: Position::start(),
            tokens: Vec::new(),
            indents: IndentStack::new(),
        }
    }

    /// Scan the whole source
    pub fn run(mut self) -> LexOutput {
        let error = self.scan().err();
        LexOutput {
            tokens: self.tokens,
            error,
        }
    }

    pub fn tokenize(self) -> Result<Vec<SpannedToken>, LexerError> {
        self.run().into_result()
    }

    // === CHARACTER ACCESS ===

    fn rest(&self) -> &'a str {
        &self.source[self.position.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position = self.position.advance(ch);
        Some(ch)
    }

    fn starts_with_line_break(&self) -> bool {
        let rest = self.rest();
        rest.starts_with('\n') || rest.starts_with("\r\n")
    }

    // === TOKEN EMISSION ===

    fn push(&mut self, token: Token, span: Span) -> Result<(), LexerError> {
        if self.tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexerError::TooManyTokens {
                count: self.tokens.len() + 1,
                position: span.start,
            });
        }
        self.tokens.push(SpannedToken::new(token, span));
        Ok(())
    }

    // === MAIN LOOP ===

    fn scan(&mut self) -> Result<(), LexerError> {
        let mut at_line_start = true;
        let mut continuation = false;

        loop {
            if at_line_start {
                at_line_start = false;
                if continuation {
                    continuation = false;
                } else {
                    self.handle_indentation()?;
                }
            }

            let Some(ch) = self.peek() else {
                break;
            };
            let start = self.position;

            match ch {
                '\n' => {
                    self.bump();
                    self.push(Token::newline(), Span::new(start, self.position))?;
                    at_line_start = true;
                }
                '\r' | ' ' | '\t' | '\x0c' => {
                    self.bump();
                }
                '\\' => {
                    self.bump();
                    if self.starts_with_line_break() {
                        if self.peek() == Some('\r') {
                            self.bump();
                        }
                        self.bump();
                        continuation = true;
                        at_line_start = true;
                    } else {
                        return Err(LexerError::InvalidCharacter {
                            character: '\\',
                            position: start,
                        });
                    }
                }
                '#' => self.skip_line_comment(),
                '"' | '\'' => {
                    if self.peek_nth(1) == Some(ch) && self.peek_nth(2) == Some(ch) {
                        self.skip_block_comment(ch)?;
                    } else {
                        self.scan_string(ch)?;
                    }
                }
                c if c.is_alphabetic() || c == '_' => self.scan_word()?,
                c if c.is_ascii_digit() => self.scan_integer()?,
                c if is_operator_char(c) => self.scan_operator()?,
                c => match classify_delimiter(c) {
                    Some(name) => {
                        self.bump();
                        self.push(
                            Token::new(TokenKind::Delimiter(name)),
                            Span::new(start, self.position),
                        )?;
                    }
                    None => {
                        return Err(LexerError::InvalidCharacter {
                            character: c,
                            position: start,
                        })
                    }
                },
            }
        }

        self.finish()
    }

    /// End of input: close the last logical line and every open indentation level
    fn finish(&mut self) -> Result<(), LexerError> {
        let end = Span::empty(self.position);

        let needs_newline = self
            .tokens
            .last()
            .map(|t| !t.value.is_newline())
            .unwrap_or(false);
        if needs_newline {
            self.push(Token::newline(), end)?;
        }

        for _ in 0..self.indents.close_all() {
            self.push(Token::dedent(), end)?;
        }
        Ok(())
    }

    // === INDENTATION ===

    fn handle_indentation(&mut self) -> Result<(), LexerError> {
        let line_start = self.position;
        let run_len = self
            .rest()
            .find(|c: char| !matches!(c, ' ' | '\t' | '\x0c'))
            .unwrap_or(self.rest().len());
        let run = &self.rest()[..run_len];

        for ch in run.chars() {
            self.position = self.position.advance(ch);
        }

        let width = measure_indentation(run, line_start)?;

        // blank and comment-only lines leave the indentation alone
        if self.skip_comment_only_line()? {
            return Ok(());
        }

        let span = Span::empty(self.position);

        match self.indents.update(width, self.position)? {
            IndentChange::Same => {}
            IndentChange::Indent => {
                self.push(Token::indent(), span)?;
            }
            IndentChange::Dedent(levels) => {
                for _ in 0..levels {
                    self.push(Token::dedent(), span)?;
                }
            }
        }
        Ok(())
    }

    /// Consume block comments at the start of a line; true when nothing but a line
    /// comment or the line break follows them
    fn skip_comment_only_line(&mut self) -> Result<bool, LexerError> {
        loop {
            match self.peek() {
                None | Some('\n') | Some('#') => return Ok(true),
                Some('\r') if self.peek_nth(1) == Some('\n') => return Ok(true),
                Some(quote @ ('"' | '\''))
                    if self.peek_nth(1) == Some(quote) && self.peek_nth(2) == Some(quote) =>
                {
                    self.skip_block_comment(quote)?;
                    while matches!(self.peek(), Some(' ' | '\t' | '\x0c')) {
                        self.bump();
                    }
                }
                _ => return Ok(false),
            }
        }
    }

    // === COMMENTS ===

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self, quote: char) -> Result<(), LexerError> {
        let start = self.position;
        let delimiter: String = std::iter::repeat(quote).take(3).collect();

        for _ in 0..3 {
            self.bump();
        }

        match self.rest().find(delimiter.as_str()) {
            Some(index) => {
                let consumed = &self.rest()[..index + delimiter.len()];
                self.position = self.position.advance_str(consumed);
                Ok(())
            }
            None => Err(LexerError::UnterminatedBlockComment { position: start }),
        }
    }

    // === LITERALS AND WORDS ===

    fn scan_string(&mut self, quote: char) -> Result<(), LexerError> {
        let start = self.position;
        self.bump();

        let Some(length) = self.rest().find(quote) else {
            return Err(LexerError::UnterminatedString { position: start });
        };

        if length > MAX_STRING_SIZE {
            return Err(LexerError::StringTooLarge {
                size: length,
                position: start,
            });
        }

        let content = &self.rest()[..length];
        self.position = self.position.advance_str(content);
        self.bump();

        self.push(Token::string(content), Span::new(start, self.position))
    }

    fn scan_word(&mut self) -> Result<(), LexerError> {
        let start = self.position;
        let length = self
            .rest()
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(self.rest().len());
        let word = &self.rest()[..length];

        let char_count = word.chars().count();
        if char_count > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                length: char_count,
                position: start,
            });
        }

        self.position = self.position.advance_str(word);
        self.push(classify_word(word), Span::new(start, self.position))
    }

    fn scan_integer(&mut self) -> Result<(), LexerError> {
        let start = self.position;
        let length = self
            .rest()
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest().len());
        let digits = &self.rest()[..length];
        self.position = self.position.advance_str(digits);

        if let Some(suffix) = self.peek() {
            if suffix.is_alphabetic() || suffix == '_' {
                return Err(LexerError::MalformedInteger {
                    digits: digits.to_string(),
                    suffix,
                    position: self.position,
                });
            }
        }

        self.push(Token::integer(digits), Span::new(start, self.position))
    }

    fn scan_operator(&mut self) -> Result<(), LexerError> {
        let start = self.position;
        match match_operator(self.rest()) {
            Some((text, name)) => {
                self.position = self.position.advance_str(text);
                self.push(
                    Token::new(TokenKind::Operator(name)),
                    Span::new(start, self.position),
                )
            }
            None => Err(LexerError::InvalidCharacter {
                character: self.peek().unwrap_or('\0'),
                position: start,
            }),
        }
    }
}

/// Tokenize a source text
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexerError> {
    Lexer::new(source).tokenize()
}

/// Tokenize, keeping the tokens produced before an error
pub fn tokenize_partial(source: &str) -> LexOutput {
    Lexer::new(source).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::token_stream::validation::{
        validate_indentation_balance, validate_span_order,
    };
    use assert_matches::assert_matches;

    fn kinds(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .iter()
            .map(|t| match t.value.lexeme() {
                Some(lexeme) => format!("{}({})", t.value.kind_name(), lexeme),
                None => t.value.kind_name().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_simple_assignment() {
        assert_eq!(
            kinds("x = 1\n"),
            vec!["id(x)", "tk_assign", "tk_integer(1)", "tk_newline"]
        );
    }

    #[test]
    fn test_block_indent_and_dedent() {
        assert_eq!(
            kinds("if x:\n    y\n"),
            vec![
                "if",
                "id(x)",
                "tk_colon",
                "tk_newline",
                "tk_indent",
                "id(y)",
                "tk_newline",
                "tk_dedent"
            ]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("x = 1\nyy\n").unwrap();
        assert_eq!(tokens[0].span.start, Position::new(0, 1, 1));
        assert_eq!(tokens[1].span.start.column, 3);
        assert_eq!(tokens[2].span.start.column, 5);
        // newline token sits on the newline character
        assert_eq!(tokens[3].span.start, Position::new(5, 1, 6));
        assert_eq!(tokens[4].span.start, Position::new(6, 2, 1));
    }

    #[test]
    fn test_nested_blocks_close_at_end() {
        let source = "def f():\n    if x:\n        pass\n    return 1\n";
        let tokens = tokenize(source).unwrap();

        assert!(validate_indentation_balance(&tokens).is_ok());
        assert!(validate_span_order(&tokens).is_ok());

        let names: Vec<&str> = tokens.iter().map(|t| t.value.kind_name()).collect();
        let dedents = names.iter().filter(|k| **k == "tk_dedent").count();
        assert_eq!(dedents, 2);
        assert_eq!(names.last(), Some(&"tk_dedent"));
    }

    #[test]
    fn test_blank_and_comment_lines_keep_indentation() {
        let source = "if x:\n    y = 1\n\n  # note\n    z = 2\n";
        let names = kinds(source);
        assert_eq!(names.iter().filter(|k| *k == "tk_indent").count(), 1);
        assert_eq!(names.iter().filter(|k| *k == "tk_dedent").count(), 1);
        assert_eq!(names.iter().filter(|k| *k == "tk_newline").count(), 5);
    }

    #[test]
    fn test_line_continuation() {
        let names = kinds("x = 1 + \\\n        2\n");
        assert_eq!(
            names,
            vec![
                "id(x)",
                "tk_assign",
                "tk_integer(1)",
                "tk_plus",
                "tk_integer(2)",
                "tk_newline"
            ]
        );
    }

    #[test]
    fn test_tabs_count_to_next_stop() {
        let names = kinds("if x:\n\ty\nif z:\n        w\n");
        assert_eq!(names.iter().filter(|k| *k == "tk_indent").count(), 2);
    }

    #[test]
    fn test_mixed_indentation_is_error() {
        let result = tokenize("if x:\n \ty\n");
        assert_matches!(result, Err(LexerError::MixedIndentation { position }) if position.line == 2);
    }

    #[test]
    fn test_mixed_indentation_on_blank_and_comment_lines() {
        let result = tokenize("x = 1\n \t# note\ny = 2\n");
        assert_matches!(result, Err(LexerError::MixedIndentation { position }) if position.line == 2);

        let result = tokenize("x = 1\n \t\ny = 2\n");
        assert_matches!(result, Err(LexerError::MixedIndentation { position }) if position.line == 2);

        let output = tokenize_partial("x = 1\n\t \n");
        assert_eq!(output.tokens.len(), 4);
        assert_matches!(output.error, Some(LexerError::MixedIndentation { .. }));
    }

    #[test]
    fn test_block_comment_lines_keep_indentation() {
        assert_eq!(
            kinds("if x:\n    y\n'''note'''\n    z\n"),
            vec![
                "if",
                "id(x)",
                "tk_colon",
                "tk_newline",
                "tk_indent",
                "id(y)",
                "tk_newline",
                "tk_newline",
                "id(z)",
                "tk_newline",
                "tk_dedent"
            ]
        );

        let names = kinds("if x:\n    y\n  \"\"\"a\nb\"\"\"  # tail\n    z\n");
        assert_eq!(names.iter().filter(|k| *k == "tk_indent").count(), 1);
        assert_eq!(names.iter().filter(|k| *k == "tk_dedent").count(), 1);
    }

    #[test]
    fn test_code_after_block_comment_is_indented() {
        let names = kinds("if x:\n    '''a''' y\n");
        assert_eq!(&names[3..6], &["tk_newline", "tk_indent", "id(y)"]);
    }

    #[test]
    fn test_inconsistent_dedent_is_error() {
        let result = tokenize("if x:\n    y\n  z\n");
        assert_matches!(result, Err(LexerError::IndentationMismatch { width: 2, .. }));
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("a //= b ** c != d -> e\n"),
            vec![
                "id(a)",
                "tk_floordiv_assign",
                "id(b)",
                "tk_pow",
                "id(c)",
                "tk_neq",
                "id(d)",
                "tk_arrow",
                "id(e)",
                "tk_newline"
            ]
        );
    }

    #[test]
    fn test_lone_bang_is_error() {
        let result = tokenize("a ! b\n");
        assert_matches!(
            result,
            Err(LexerError::InvalidCharacter { character: '!', position }) if position.column == 3
        );
    }

    #[test]
    fn test_strings_are_verbatim() {
        let tokens = tokenize("s = 'a\\nb' + \"two\nlines\"\nt\n").unwrap();
        assert_eq!(tokens[2].value.lexeme(), Some("a\\nb"));
        assert_eq!(tokens[4].value.lexeme(), Some("two\nlines"));
        assert_eq!(tokens[4].span.start.line, 1);
        // the token after the multi-line string is on line 2
        assert_eq!(tokens[5].span.start.line, 2);
        assert_eq!(tokens[6].span.start, Position::new(25, 3, 1));
    }

    #[test]
    fn test_empty_string_literal() {
        assert_eq!(kinds("''\n"), vec!["tk_string()", "tk_newline"]);
    }

    #[test]
    fn test_unterminated_string_reports_opening_quote() {
        let output = tokenize_partial("x = \"abc");
        assert_eq!(output.tokens.len(), 2);
        assert_matches!(
            output.error,
            Some(LexerError::UnterminatedString { position }) if position == Position::new(4, 1, 5)
        );
    }

    #[test]
    fn test_unterminated_string_alone_yields_no_tokens() {
        let output = tokenize_partial("\"abc");
        assert!(output.tokens.is_empty());
        assert_eq!(output.error.map(|e| e.column()), Some(1));
    }

    #[test]
    fn test_block_comments_are_discarded() {
        let source = "x = 1\n\"\"\"doc\nstring\"\"\"\ny = 2\n";
        let names = kinds(source);
        assert_eq!(
            names,
            vec![
                "id(x)",
                "tk_assign",
                "tk_integer(1)",
                "tk_newline",
                "tk_newline",
                "id(y)",
                "tk_assign",
                "tk_integer(2)",
                "tk_newline"
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_matches!(
            tokenize("x\n'''never closed\n"),
            Err(LexerError::UnterminatedBlockComment { position }) if position.line == 2
        );
    }

    #[test]
    fn test_malformed_integer_points_at_suffix() {
        assert_matches!(
            tokenize("n = 12ab\n"),
            Err(LexerError::MalformedInteger { suffix: 'a', position, .. }) if position.column == 7
        );
    }

    #[test]
    fn test_missing_final_newline_is_synthesized() {
        let tokens = tokenize("if x:\n    y").unwrap();
        let names: Vec<&str> = tokens.iter().map(|t| t.value.kind_name()).collect();
        assert_eq!(&names[names.len() - 2..], &["tk_newline", "tk_dedent"]);
    }

    #[test]
    fn test_empty_and_comment_only_sources() {
        assert!(tokenize("").unwrap().is_empty());
        assert_eq!(kinds("# only a comment"), Vec::<String>::new());
        assert_eq!(kinds("# comment\n"), vec!["tk_newline"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            kinds("a\r\n  b\r\n"),
            vec![
                "id(a)",
                "tk_newline",
                "tk_indent",
                "id(b)",
                "tk_newline",
                "tk_dedent"
            ]
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_eq!(kinds("año = 1\n")[0], "id(año)");
    }

    #[test]
    fn test_stray_backslash_is_error() {
        assert_matches!(
            tokenize("a \\ b\n"),
            Err(LexerError::InvalidCharacter { character: '\\', .. })
        );
    }
}
