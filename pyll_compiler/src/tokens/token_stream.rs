//! Parser-facing token cursor
//!
//! The stream always ends with an end-marker token. If the input does not carry one, a
//! synthetic `$` is appended at the position of the last token (or 0:0 for an empty input),
//! and the cursor never moves past it.

use crate::tokens::token::{Token, TokenKind};
use crate::utils::{Position, Span, Spanned};

pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<SpannedToken>,
    cursor: usize,
    synthesized_end: bool,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        let synthesized_end = tokens.last().map_or(true, |t| !t.value.is_end_marker());

        if synthesized_end {
            let at = tokens
                .last()
                .map_or(Position::at(0, 0), |t| t.span.start);
            tokens.push(Spanned::new(Token::end_marker(), Span::empty(at)));

            crate::log_debug!("End-marker appended to token stream",
                "line" => at.line,
                "column" => at.column
            );
        }

        Self {
            tokens,
            cursor: 0,
            synthesized_end,
        }
    }

    /// The current token; once the input is exhausted this is the end-marker
    pub fn current(&self) -> &SpannedToken {
        &self.tokens[self.cursor]
    }

    pub fn current_token(&self) -> &Token {
        &self.current().value
    }

    /// Move to the next token. Has no effect on the end-marker.
    pub fn advance(&mut self) -> &SpannedToken {
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
        self.current()
    }

    pub fn is_at_end(&self) -> bool {
        self.current_token().is_end_marker()
    }

    /// Number of tokens, end-marker included
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.len() == 1
    }

    pub fn has_synthesized_end(&self) -> bool {
        self.synthesized_end
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }

    pub fn remaining(&self) -> &[SpannedToken] {
        &self.tokens[self.cursor..]
    }
}

/// Lays tokens out over a piece of imaginary source so their spans line up the way the
/// lexer would produce them
#[derive(Debug)]
pub struct TokenStreamBuilder {
    tokens: Vec<SpannedToken>,
    next: Position,
}

impl TokenStreamBuilder {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            next: Position::start(),
        }
    }

    pub fn push_token(mut self, token: Token, text: &str) -> Self {
        let end = self.next.advance_str(text);
        self.tokens.push(Spanned::new(token, Span::new(self.next, end)));
        self.next = end;
        self
    }

    /// Text that yields no token
    pub fn skip(mut self, text: &str) -> Self {
        self.next = self.next.advance_str(text);
        self
    }

    pub fn into_tokens(self) -> Vec<SpannedToken> {
        self.tokens
    }

    pub fn build(self) -> TokenStream {
        TokenStream::new(self.tokens)
    }
}

impl Default for TokenStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural checks over lexer output
pub mod validation {
    use super::{SpannedToken, TokenKind};

    /// Tokens appear in source order and never overlap
    pub fn validate_span_order(tokens: &[SpannedToken]) -> Result<(), String> {
        match tokens
            .windows(2)
            .find(|pair| pair[0].span.end.offset > pair[1].span.start.offset)
        {
            Some(pair) => Err(format!(
                "Token at {} overlaps the token at {}",
                pair[0].span.start, pair[1].span.start
            )),
            None => Ok(()),
        }
    }

    /// Every INDENT is closed by a DEDENT and no DEDENT comes unmatched
    pub fn validate_indentation_balance(tokens: &[SpannedToken]) -> Result<(), String> {
        let mut open = 0usize;
        for token in tokens {
            match token.value.kind {
                TokenKind::Indent => open += 1,
                TokenKind::Dedent if open == 0 => {
                    return Err(format!("Unmatched dedent at {}", token.span.start));
                }
                TokenKind::Dedent => open -= 1,
                _ => {}
            }
        }

        match open {
            0 => Ok(()),
            n => Err(format!("{} indentation level(s) left open", n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment() -> Vec<SpannedToken> {
        TokenStreamBuilder::new()
            .push_token(Token::identifier("x"), "x")
            .skip(" ")
            .push_token(Token::new(TokenKind::Operator("tk_assign")), "=")
            .skip(" ")
            .push_token(Token::integer("1"), "1")
            .push_token(Token::newline(), "\n")
            .into_tokens()
    }

    #[test]
    fn test_end_marker_appended_at_last_position() {
        let stream = TokenStream::new(assignment());
        assert!(stream.has_synthesized_end());
        assert_eq!(stream.len(), 5);

        let tokens = stream.tokens();
        assert!(tokens[4].value.is_end_marker());
        assert_eq!(tokens[4].span.start, tokens[3].span.start);
    }

    #[test]
    fn test_empty_input_gets_end_marker_at_origin() {
        let stream = TokenStream::new(Vec::new());
        assert!(stream.is_empty());
        assert!(stream.is_at_end());
        assert_eq!(stream.current().span.start, Position::at(0, 0));
    }

    #[test]
    fn test_supplied_end_marker_is_kept() {
        let mut tokens = assignment();
        tokens.push(Spanned::new(Token::end_marker(), Span::empty(Position::at(2, 1))));

        let stream = TokenStream::new(tokens);
        assert!(!stream.has_synthesized_end());
        assert_eq!(stream.len(), 5);
        assert_eq!(stream.tokens()[4].span.start, Position::at(2, 1));
    }

    #[test]
    fn test_cursor_stops_on_end_marker() {
        let mut stream = TokenStream::new(assignment());
        for _ in 0..10 {
            stream.advance();
        }
        assert!(stream.is_at_end());
        assert_eq!(stream.cursor(), 4);
        assert_eq!(stream.remaining().len(), 1);
    }

    #[test]
    fn test_builder_columns_follow_text() {
        let tokens = assignment();
        assert_eq!(tokens[1].span.start.column, 3);
        assert_eq!(tokens[2].span.start.column, 5);
        assert!(validation::validate_span_order(&tokens).is_ok());
    }

    #[test]
    fn test_indentation_balance() {
        let balanced = TokenStreamBuilder::new()
            .push_token(Token::indent(), "")
            .push_token(Token::dedent(), "")
            .into_tokens();
        assert!(validation::validate_indentation_balance(&balanced).is_ok());

        let open = TokenStreamBuilder::new()
            .push_token(Token::indent(), "")
            .into_tokens();
        assert!(validation::validate_indentation_balance(&open).is_err());

        let stray = TokenStreamBuilder::new()
            .push_token(Token::dedent(), "")
            .into_tokens();
        assert!(validation::validate_indentation_balance(&stray).is_err());
    }
}
